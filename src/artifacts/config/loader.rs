//! Property set → [`Configuration`]
//!
//! The on-disk syntax is read by the host; this module receives the parsed
//! key/value pairs of one configuration and validates them. Every problem is
//! collected so the user sees them all at once.
//!
//! ## Keys
//!
//! - `project-id` / `project-id-env`, `api-token` / `api-token-env`,
//!   `base-url` / `base-url-env`: value, or name of an environment variable
//! - `disable-branches`, `preserve-hierarchy`, `debug`, `auto-upload`
//! - `sources`: comma list of file names under any `values/` directory
//! - `files.<n>.source`, `files.<n>.translation`, `files.<n>.labels`,
//!   `files.<n>.excluded-target-languages`
//! - `labels`, `excluded-target-languages`: defaults for rules declaring none

use crate::artifacts::config::configuration::Configuration;
use crate::artifacts::config::file_mapping_rule::{
    DEFAULT_SOURCES_PREFIX, DEFAULT_TRANSLATION, FileMappingRule,
};
use crate::errors::ConfigurationError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

pub const PROJECT_ID: &str = "project-id";
pub const PROJECT_ID_ENV: &str = "project-id-env";
pub const API_TOKEN: &str = "api-token";
pub const API_TOKEN_ENV: &str = "api-token-env";
pub const BASE_URL: &str = "base-url";
pub const BASE_URL_ENV: &str = "base-url-env";
pub const DISABLE_BRANCHES: &str = "disable-branches";
pub const PRESERVE_HIERARCHY: &str = "preserve-hierarchy";
pub const DEBUG: &str = "debug";
pub const AUTO_UPLOAD: &str = "auto-upload";
pub const SOURCES: &str = "sources";
pub const LABELS: &str = "labels";
pub const EXCLUDED_TARGET_LANGUAGES: &str = "excluded-target-languages";

const DISABLE_BRANCHES_DEFAULT: bool = false;
const PRESERVE_HIERARCHY_DEFAULT: bool = false;

static NUMBERED_RULE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^files\.(\d+)\.(?:source|translation)$").expect("rule key pattern compiles")
});

static BASE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https://(?:[a-zA-Z0-9_-]+\.)?crowdin\.com/?|http://.+\.dev\.crowdin\.com/?)$")
        .expect("base url pattern compiles")
});

/// Source of environment variables referenced by `*-env` keys.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

pub struct ConfigurationLoader<'e> {
    environment: &'e dyn Environment,
}

impl<'e> ConfigurationLoader<'e> {
    pub fn new(environment: &'e dyn Environment) -> Self {
        Self { environment }
    }

    pub fn load(
        &self,
        name: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<Configuration, ConfigurationError> {
        let mut problems = Vec::new();
        let mut missing_variables = Vec::new();

        let project_id = match self.value_or_env(
            properties,
            PROJECT_ID,
            PROJECT_ID_ENV,
            &mut missing_variables,
        ) {
            Some((value, from_env)) => match value.trim().parse::<u64>() {
                Ok(project_id) => Some(project_id),
                Err(_) if from_env => {
                    problems.push(format!(
                        "environment variable '{}' is not a number",
                        properties[PROJECT_ID_ENV]
                    ));
                    None
                }
                Err(_) => {
                    problems.push(format!("property '{PROJECT_ID}' is not a number"));
                    None
                }
            },
            None => {
                if non_empty(properties, PROJECT_ID_ENV).is_none() {
                    problems.push(format!("missing property '{PROJECT_ID}'"));
                }
                None
            }
        };

        let api_token = match self.value_or_env(
            properties,
            API_TOKEN,
            API_TOKEN_ENV,
            &mut missing_variables,
        ) {
            Some((value, _)) => Some(value),
            None => {
                if non_empty(properties, API_TOKEN_ENV).is_none() {
                    problems.push(format!("missing property '{API_TOKEN}'"));
                }
                None
            }
        };

        let base_url = match self.value_or_env(
            properties,
            BASE_URL,
            BASE_URL_ENV,
            &mut missing_variables,
        ) {
            Some((value, _)) if BASE_URL_PATTERN.is_match(&value) => Some(value),
            Some((value, true)) => {
                problems.push(format!(
                    "environment variable '{}' holds an invalid base URL: '{value}'",
                    properties[BASE_URL_ENV]
                ));
                None
            }
            Some((_, false)) => {
                problems.push(format!("property '{BASE_URL}' is not a valid URL"));
                None
            }
            None => None,
        };

        match missing_variables.as_slice() {
            [] => {}
            [variable] => problems.push(format!("environment variable '{variable}' is not set")),
            variables => problems.push(format!(
                "environment variables {} are not set",
                variables
                    .iter()
                    .map(|variable| format!("'{variable}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }

        let files = file_rules(properties, &mut problems);

        match (project_id, api_token) {
            (Some(project_id), Some(api_token)) if problems.is_empty() => Ok(Configuration {
                name: name.to_string(),
                project_id,
                api_token,
                base_url,
                branching_enabled: !flag(properties, DISABLE_BRANCHES)
                    .unwrap_or(DISABLE_BRANCHES_DEFAULT),
                preserve_hierarchy: flag(properties, PRESERVE_HIERARCHY)
                    .unwrap_or(PRESERVE_HIERARCHY_DEFAULT),
                debug: flag(properties, DEBUG).unwrap_or(false),
                auto_upload: properties
                    .get(AUTO_UPLOAD)
                    .is_none_or(|value| value.trim() != "false"),
                files,
            }),
            _ => Err(ConfigurationError {
                configuration: name.to_string(),
                problems,
            }),
        }
    }

    /// `(value, read_from_environment)` for a key that may be given directly
    /// or through an environment variable. The direct value wins.
    fn value_or_env(
        &self,
        properties: &BTreeMap<String, String>,
        key: &str,
        env_key: &str,
        missing_variables: &mut Vec<String>,
    ) -> Option<(String, bool)> {
        if let Some(value) = non_empty(properties, key) {
            return Some((value.to_string(), false));
        }

        let variable = non_empty(properties, env_key)?;
        match self.environment.var(variable) {
            Some(value) => Some((value, true)),
            None => {
                missing_variables.push(variable.to_string());
                None
            }
        }
    }
}

fn non_empty<'p>(properties: &'p BTreeMap<String, String>, key: &str) -> Option<&'p str> {
    properties
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn flag(properties: &BTreeMap<String, String>, key: &str) -> Option<bool> {
    properties
        .get(key)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
}

fn list(properties: &BTreeMap<String, String>, key: &str) -> Option<BTreeSet<String>> {
    non_empty(properties, key).map(|value| split_list(value).collect())
}

fn list_in_order(properties: &BTreeMap<String, String>, key: &str) -> Vec<String> {
    non_empty(properties, key)
        .map(|value| split_list(value).collect())
        .unwrap_or_default()
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

fn file_rules(properties: &BTreeMap<String, String>, problems: &mut Vec<String>) -> Vec<FileMappingRule> {
    let mut rules: Vec<(FileMappingRule, bool, bool)> = Vec::new();

    for source in list_in_order(properties, SOURCES) {
        match FileMappingRule::new(&format!("{DEFAULT_SOURCES_PREFIX}{source}"), DEFAULT_TRANSLATION) {
            Ok(rule) => rules.push((rule, false, false)),
            Err(error) => problems.extend(error.problems),
        }
    }

    let mut idents: Vec<u64> = properties
        .keys()
        .filter_map(|key| NUMBERED_RULE_KEY.captures(key))
        .filter_map(|captures| captures[1].parse().ok())
        .collect();
    idents.sort_unstable();
    idents.dedup();

    for ident in idents {
        let source_key = format!("files.{ident}.source");
        let translation_key = format!("files.{ident}.translation");

        match (
            non_empty(properties, &source_key),
            non_empty(properties, &translation_key),
        ) {
            (Some(source), Some(translation)) => match FileMappingRule::new(source, translation) {
                Ok(mut rule) => {
                    let labels = list(properties, &format!("files.{ident}.labels"));
                    let excluded = list(
                        properties,
                        &format!("files.{ident}.excluded-target-languages"),
                    );
                    let (has_labels, has_excluded) = (labels.is_some(), excluded.is_some());
                    if let Some(labels) = labels {
                        rule = rule.with_labels(labels);
                    }
                    if let Some(excluded) = excluded {
                        rule = rule.with_excluded_target_languages(excluded);
                    }
                    rules.push((rule, has_labels, has_excluded));
                }
                Err(error) => problems.extend(error.problems),
            },
            (_, None) => problems.push(format!("missing property '{translation_key}'")),
            (None, _) => problems.push(format!("missing property '{source_key}'")),
        }
    }

    if rules.is_empty() {
        rules.push((FileMappingRule::android_default(), false, false));
    }

    let labels = list(properties, LABELS).unwrap_or_default();
    let excluded = list(properties, EXCLUDED_TARGET_LANGUAGES).unwrap_or_default();

    rules
        .into_iter()
        .map(|(mut rule, has_labels, has_excluded)| {
            if !has_labels {
                rule = rule.with_labels(labels.iter().cloned());
            }
            if !has_excluded {
                rule = rule.with_excluded_target_languages(excluded.iter().cloned());
            }
            rule
        })
        .collect()
}
