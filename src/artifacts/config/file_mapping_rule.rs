use crate::artifacts::paths::project_path::ProjectPath;
use crate::artifacts::remote::language::Language;
use crate::errors::ConfigurationError;
use std::collections::BTreeSet;

/// Source pattern substituted when a configuration declares no rule.
pub const DEFAULT_SOURCE: &str = "/**/values/strings.xml";
/// Translation template paired with [`DEFAULT_SOURCE`] and with every entry of `sources`.
pub const DEFAULT_TRANSLATION: &str = "/%original_path%-%android_code%/%original_file_name%";
/// Directory prefix applied to every entry of the `sources` property.
pub const DEFAULT_SOURCES_PREFIX: &str = "/**/values/";

/// One `(source glob, translation template)` pair with its metadata.
///
/// Both patterns are non-empty and kept in canonical form (leading `/`,
/// forward slashes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileMappingRule {
    source: String,
    translation: String,
    labels: BTreeSet<String>,
    excluded_target_languages: BTreeSet<String>,
}

impl FileMappingRule {
    pub fn new(source: &str, translation: &str) -> Result<Self, ConfigurationError> {
        let mut problems = Vec::new();
        if source.trim().is_empty() {
            problems.push("source pattern is empty".to_string());
        }
        if translation.trim().is_empty() {
            problems.push("translation pattern is empty".to_string());
        }
        if !problems.is_empty() {
            return Err(ConfigurationError {
                configuration: String::new(),
                problems,
            });
        }

        Ok(Self {
            source: ProjectPath::parse(source.trim()).as_str().to_string(),
            translation: ProjectPath::parse(translation.trim()).as_str().to_string(),
            labels: BTreeSet::new(),
            excluded_target_languages: BTreeSet::new(),
        })
    }

    pub fn android_default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            translation: DEFAULT_TRANSLATION.to_string(),
            labels: BTreeSet::new(),
            excluded_target_languages: BTreeSet::new(),
        }
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    pub fn with_excluded_target_languages(
        mut self,
        languages: impl IntoIterator<Item = String>,
    ) -> Self {
        self.excluded_target_languages = languages.into_iter().collect();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn excluded_target_languages(&self) -> &BTreeSet<String> {
        &self.excluded_target_languages
    }

    pub fn excludes(&self, language: &Language) -> bool {
        self.excluded_target_languages.contains(&language.id)
    }
}
