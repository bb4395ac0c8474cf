//! Translation template placeholders
//!
//! A template such as `/values-%android_code%/%original_file_name%` mixes
//! literal text with `%name%` tokens. Only names in [`PLACEHOLDERS`] are
//! substituted; any other `%text%` is kept literally.

use crate::artifacts::paths::project_path::ProjectPath;
use crate::artifacts::remote::language::Language;
use crate::errors::{Result, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Language,
    TwoLettersCode,
    ThreeLettersCode,
    Locale,
    LocaleWithUnderscore,
    AndroidCode,
    OsxCode,
    OsxLocale,
    OriginalFileName,
    FileName,
    FileExtension,
    OriginalPath,
}

pub static PLACEHOLDERS: phf::Map<&'static str, Placeholder> = phf::phf_map! {
    "language" => Placeholder::Language,
    "two_letters_code" => Placeholder::TwoLettersCode,
    "two_letters" => Placeholder::TwoLettersCode,
    "three_letters_code" => Placeholder::ThreeLettersCode,
    "three_letters" => Placeholder::ThreeLettersCode,
    "locale" => Placeholder::Locale,
    "locale_with_underscore" => Placeholder::LocaleWithUnderscore,
    "android_code" => Placeholder::AndroidCode,
    "osx_code" => Placeholder::OsxCode,
    "osx_locale" => Placeholder::OsxLocale,
    "original_file_name" => Placeholder::OriginalFileName,
    "file_name" => Placeholder::FileName,
    "file_extension" => Placeholder::FileExtension,
    "original_path" => Placeholder::OriginalPath,
};

impl Placeholder {
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Language => "language",
            Placeholder::TwoLettersCode => "two_letters_code",
            Placeholder::ThreeLettersCode => "three_letters_code",
            Placeholder::Locale => "locale",
            Placeholder::LocaleWithUnderscore => "locale_with_underscore",
            Placeholder::AndroidCode => "android_code",
            Placeholder::OsxCode => "osx_code",
            Placeholder::OsxLocale => "osx_locale",
            Placeholder::OriginalFileName => "original_file_name",
            Placeholder::FileName => "file_name",
            Placeholder::FileExtension => "file_extension",
            Placeholder::OriginalPath => "original_path",
        }
    }

    pub fn is_language(self) -> bool {
        !matches!(
            self,
            Placeholder::OriginalFileName
                | Placeholder::FileName
                | Placeholder::FileExtension
                | Placeholder::OriginalPath
        )
    }

    /// Value of a language placeholder, `None` for file placeholders.
    pub fn language_value(self, language: &Language) -> Option<String> {
        let value = match self {
            Placeholder::Language => language.name.clone(),
            Placeholder::TwoLettersCode => language.two_letters_code.clone(),
            Placeholder::ThreeLettersCode => language.three_letters_code.clone(),
            Placeholder::Locale => language.locale.clone(),
            Placeholder::LocaleWithUnderscore => language.locale.replace('-', "_"),
            Placeholder::AndroidCode => language.android_code.clone(),
            Placeholder::OsxCode => language.osx_code.clone(),
            Placeholder::OsxLocale => language.osx_locale.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Value of a file placeholder, `None` for language placeholders.
    pub fn source_value(self, source: &ProjectPath) -> Option<&str> {
        match self {
            Placeholder::OriginalFileName => Some(source.file_name()),
            Placeholder::FileName => Some(source.file_stem()),
            Placeholder::FileExtension => Some(source.extension()),
            Placeholder::OriginalPath => Some(source.original_path()),
            _ => None,
        }
    }

    pub fn resolve(self, source: &ProjectPath, language: &Language) -> Result<String> {
        if let Some(value) = self.source_value(source) {
            return Ok(value.to_string());
        }

        match self.language_value(language) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(SyncError::PlaceholderResolution {
                placeholder: self.name(),
                language: language.id.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Literal(String),
    Placeholder(Placeholder),
}

pub fn tokenize(template: &str) -> Vec<TemplateToken> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        literal.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let recognized = after
            .find('%')
            .and_then(|end| PLACEHOLDERS.get(&after[..end]).map(|p| (end, *p)));

        match recognized {
            Some((end, placeholder)) => {
                if !literal.is_empty() {
                    tokens.push(TemplateToken::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(TemplateToken::Placeholder(placeholder));
                rest = &after[end + 1..];
            }
            None => {
                // not a placeholder: keep the '%' and rescan from the next char
                literal.push('%');
                rest = after;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(TemplateToken::Literal(literal));
    }

    tokens
}
