//! Translation path templates, forwards and backwards.
//!
//! Forwards, a template is expanded for one source file and one language.
//! Backwards, the same template is compiled into an anchored regex per
//! candidate language: language placeholders become that language's escaped
//! codes, file placeholders become capture groups and literals escaped runs.
//! A candidate translation path is traced back to the first language whose
//! regex matches, together with what it reveals about its source file.

use crate::artifacts::paths::project_path::ProjectPath;
use crate::artifacts::pattern::placeholder::{Placeholder, TemplateToken, tokenize};
use crate::artifacts::remote::language::Language;
use crate::errors::{ConfigurationError, Result};
use dashmap::DashMap;
use regex::{Captures, Regex};

const ANY_LANGUAGE_CODE: &str = "(?:[^/]+?)";

/// What a matched translation path reveals about its source file.
///
/// Only the parts that the template actually mentions are known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceHint {
    pub original_path: Option<String>,
    pub file_name: Option<String>,
    pub file_stem: Option<String>,
    pub extension: Option<String>,
}

impl SourceHint {
    pub fn is_satisfied_by(&self, source: &ProjectPath) -> bool {
        let agrees = |known: &Option<String>, actual: &str| {
            known.as_deref().is_none_or(|known| known == actual)
        };

        agrees(&self.original_path, source.original_path())
            && agrees(&self.file_name, source.file_name())
            && agrees(&self.file_stem, source.file_stem())
            && agrees(&self.extension, source.extension())
    }

    fn slot(&mut self, placeholder: Placeholder) -> Option<&mut Option<String>> {
        match placeholder {
            Placeholder::OriginalPath => Some(&mut self.original_path),
            Placeholder::OriginalFileName => Some(&mut self.file_name),
            Placeholder::FileName => Some(&mut self.file_stem),
            Placeholder::FileExtension => Some(&mut self.extension),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslationTemplate {
    template: String,
    tokens: Vec<TemplateToken>,
    /// Any language code in place of language placeholders; rejects paths of
    /// the wrong shape before any per-language matcher is built.
    shape: Regex,
    /// File placeholder behind each capture group, in group order.
    groups: Vec<Placeholder>,
    /// Per-language matchers keyed by their pattern.
    by_language: DashMap<String, Regex>,
}

impl TranslationTemplate {
    pub fn compile(template: &str) -> Result<Self> {
        let template = ProjectPath::parse(template).as_str().to_string();
        let tokens = tokenize(&template);
        let pattern = inverse_pattern(&tokens, |_| Some(ANY_LANGUAGE_CODE.to_string()))
            .unwrap_or_default();
        let shape = Regex::new(&pattern).map_err(|error| {
            ConfigurationError::single(
                "",
                format!("invalid translation pattern '{template}': {error}"),
            )
        })?;
        let groups = tokens
            .iter()
            .filter_map(|token| match token {
                TemplateToken::Placeholder(placeholder) if !placeholder.is_language() => {
                    Some(*placeholder)
                }
                _ => None,
            })
            .collect();

        Ok(Self {
            template,
            tokens,
            shape,
            groups,
            by_language: DashMap::new(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn has_language_placeholder(&self) -> bool {
        self.tokens.iter().any(|token| {
            matches!(token, TemplateToken::Placeholder(placeholder) if placeholder.is_language())
        })
    }

    pub fn expand(&self, source: &ProjectPath, language: &Language) -> Result<ProjectPath> {
        let mut expanded = String::new();

        for token in &self.tokens {
            match token {
                TemplateToken::Literal(text) => expanded.push_str(text),
                TemplateToken::Placeholder(placeholder) => {
                    expanded.push_str(&placeholder.resolve(source, language)?)
                }
            }
        }

        Ok(ProjectPath::parse(&expanded))
    }

    /// Recovers `(hint, language)` from `candidate`, trying `languages` in
    /// order with their codes spelled out in the pattern.
    pub fn match_path(
        &self,
        candidate: &ProjectPath,
        languages: &[Language],
    ) -> Option<(SourceHint, Language)> {
        if !self.has_language_placeholder() || !self.shape.is_match(candidate.as_str()) {
            return None;
        }

        languages.iter().find_map(|language| {
            let matcher = self.matcher_for(language)?;
            let captures = matcher.captures(candidate.as_str())?;
            let hint = self.hint(&captures)?;
            Some((hint, language.clone()))
        })
    }

    /// `None` when the language lacks a code the template needs.
    fn matcher_for(&self, language: &Language) -> Option<Regex> {
        let pattern = inverse_pattern(&self.tokens, |placeholder| {
            placeholder
                .language_value(language)
                .filter(|value| !value.is_empty())
                .map(|value| regex::escape(&value))
        })?;

        self.by_language
            .entry(pattern.clone())
            .or_try_insert_with(|| Regex::new(&pattern))
            .ok()
            .map(|matcher| matcher.clone())
    }

    /// Repeated file placeholders must capture the same text.
    fn hint(&self, captures: &Captures<'_>) -> Option<SourceHint> {
        let mut hint = SourceHint::default();

        for (index, placeholder) in self.groups.iter().enumerate() {
            let value = captures
                .get(index + 1)
                .map(|group| group.as_str())
                .unwrap_or_default();
            let slot = hint.slot(*placeholder)?;

            if let Some(known) = slot.as_deref() {
                if known != value {
                    return None;
                }
            } else {
                *slot = Some(value.to_string());
            }
        }

        Some(hint)
    }
}

/// Anchored inverse pattern of `tokens`. `language_code` supplies the regex
/// for each language placeholder; `None` from it abandons the pattern.
fn inverse_pattern(
    tokens: &[TemplateToken],
    mut language_code: impl FnMut(Placeholder) -> Option<String>,
) -> Option<String> {
    let mut pattern = String::from("^");
    let mut skip_separator = false;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            TemplateToken::Literal(text) => {
                let text = if skip_separator {
                    &text[1..]
                } else {
                    text.as_str()
                };
                skip_separator = false;
                pattern.push_str(&regex::escape(text));
            }
            TemplateToken::Placeholder(placeholder) if placeholder.is_language() => {
                pattern.push_str(&language_code(*placeholder)?);
            }
            TemplateToken::Placeholder(placeholder) => {
                let next_is_separator = matches!(
                    tokens.get(index + 1),
                    Some(TemplateToken::Literal(text)) if text.starts_with('/')
                );

                match placeholder {
                    // an empty original path collapses "a/%original_path%/b" to "a/b"
                    Placeholder::OriginalPath if next_is_separator => {
                        pattern.push_str("(?:(.+?)/)?");
                        skip_separator = true;
                    }
                    Placeholder::OriginalPath => pattern.push_str("(.*?)"),
                    Placeholder::FileExtension => pattern.push_str("([^/.]*)"),
                    _ => pattern.push_str("([^/]+?)"),
                }
            }
        }
    }

    pattern.push('$');
    Some(pattern)
}
