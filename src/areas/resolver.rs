//! Local file to remote identity resolution
//!
//! Rules are tried in declaration order and the first one that claims a
//! file wins, both for sources and for translations.

use crate::areas::pattern_engine::PatternEngine;
use crate::artifacts::branch::remote_branch::ResolvedBranch;
use crate::artifacts::config::configuration::Configuration;
use crate::artifacts::config::file_mapping_rule::FileMappingRule;
use crate::artifacts::core::CancellationToken;
use crate::artifacts::paths::project_path::ProjectPath;
use crate::artifacts::remote::language::Language;
use crate::artifacts::remote::snapshot::ProjectSnapshot;
use crate::errors::{Result, SyncError};
use derive_new::new;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A local source file together with the rule that owns it and its remote id.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ResolvedSourceFile {
    pub local_path: PathBuf,
    pub source: ProjectPath,
    /// Index into [`Configuration::files`].
    pub rule_index: usize,
    pub remote_id: u64,
}

/// Source file and language a local translation file was generated from.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TranslationOrigin {
    pub source: ProjectPath,
    pub language: Language,
    pub rule_index: usize,
}

pub struct FileResolver<'a> {
    engine: &'a PatternEngine,
    root: &'a Path,
}

impl<'a> FileResolver<'a> {
    pub fn new(engine: &'a PatternEngine, root: &'a Path) -> Self {
        Self { engine, root }
    }

    pub fn rule_for_source<'c>(
        &self,
        configuration: &'c Configuration,
        local_file: &Path,
    ) -> Result<Option<(usize, &'c FileMappingRule)>> {
        for (index, rule) in configuration.files.iter().enumerate() {
            if self.engine.is_source(rule, self.root, local_file)? {
                return Ok(Some((index, rule)));
            }
        }

        Ok(None)
    }

    /// Remote path a source is stored under: its project path, or only its
    /// file name when the hierarchy is flattened.
    pub fn remote_path(configuration: &Configuration, source: &ProjectPath) -> ProjectPath {
        if configuration.preserve_hierarchy {
            source.clone()
        } else {
            ProjectPath::root().join(source.file_name())
        }
    }

    pub fn source_identifier_for(
        &self,
        configuration: &Configuration,
        snapshot: &ProjectSnapshot,
        branch: &ResolvedBranch,
        local_file: &Path,
    ) -> Result<ResolvedSourceFile> {
        let not_tracked = || SyncError::SourceNotTracked {
            path: local_file.to_path_buf(),
        };

        let source = ProjectPath::from_local(self.root, local_file).ok_or_else(not_tracked)?;
        let (rule_index, _) = self
            .rule_for_source(configuration, local_file)?
            .ok_or_else(not_tracked)?;

        let remote_path = Self::remote_path(configuration, &source);
        let files = snapshot.files_in(branch.id());
        let remote = files
            .get(&remote_path)
            .ok_or_else(|| SyncError::RemoteFileMissing {
                path: remote_path.to_string(),
            })?;

        Ok(ResolvedSourceFile::new(
            local_file.to_path_buf(),
            source,
            rule_index,
            remote.id,
        ))
    }

    /// Traces a local translation file back to its source and language.
    ///
    /// A rule's inverse match only counts once a real source file under the
    /// root expands to exactly `local_file` for the matched language.
    /// `Ok(None)` means the file is not a managed translation.
    pub fn source_from_translation(
        &self,
        configuration: &Configuration,
        snapshot: &ProjectSnapshot,
        local_file: &Path,
        cancel: &CancellationToken,
    ) -> Result<Option<TranslationOrigin>> {
        let Some(candidate) = ProjectPath::from_local(self.root, local_file) else {
            return Ok(None);
        };

        for (index, rule) in configuration.files.iter().enumerate() {
            let Some((hint, language)) =
                self.engine
                    .match_translation_path(rule, &candidate, snapshot.languages())?
            else {
                continue;
            };

            if rule.excludes(&language) {
                debug!(language = language.id.as_str(), path = %candidate, "matched an excluded language");
                continue;
            }

            for source in self.engine.expand_sources(rule, self.root, cancel)? {
                let source = source?;

                if hint.is_satisfied_by(&source)
                    && self.engine.expand_translation_path(rule, &source, &language)? == candidate
                {
                    return Ok(Some(TranslationOrigin::new(source, language, index)));
                }
            }
        }

        Ok(None)
    }

    /// Every translation path of `source`, one per target language the rule
    /// does not exclude.
    pub fn translation_targets(
        &self,
        rule: &FileMappingRule,
        source: &ProjectPath,
        languages: &[Language],
    ) -> Result<Vec<(Language, ProjectPath)>> {
        languages
            .iter()
            .filter(|language| !rule.excludes(language))
            .map(|language| {
                self.engine
                    .expand_translation_path(rule, source, language)
                    .map(|path| (language.clone(), path))
            })
            .collect()
    }
}
