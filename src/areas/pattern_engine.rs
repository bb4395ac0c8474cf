//! Source expansion and translation path mapping
//!
//! The engine owns the compiled form of every pattern it has seen. Rules are
//! reused for every file event, so each source glob and translation template
//! is compiled once and shared; the `DashMap` entry API guarantees a template
//! is never compiled twice even when two tasks ask for it at the same time.

use crate::areas::workspace::{FileWalk, LocalFileSystem, is_ignored};
use crate::artifacts::config::file_mapping_rule::FileMappingRule;
use crate::artifacts::core::CancellationToken;
use crate::artifacts::paths::project_path::ProjectPath;
use crate::artifacts::pattern::glob::SourceGlob;
use crate::artifacts::pattern::template::{SourceHint, TranslationTemplate};
use crate::artifacts::remote::language::Language;
use crate::errors::{Result, SyncError};
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

pub struct PatternEngine {
    file_system: Arc<dyn LocalFileSystem>,
    globs: DashMap<String, Arc<SourceGlob>>,
    templates: DashMap<String, Arc<TranslationTemplate>>,
}

impl PatternEngine {
    pub fn new(file_system: Arc<dyn LocalFileSystem>) -> Self {
        Self {
            file_system,
            globs: DashMap::new(),
            templates: DashMap::new(),
        }
    }

    pub fn file_system(&self) -> &dyn LocalFileSystem {
        self.file_system.as_ref()
    }

    pub fn source_glob(&self, rule: &FileMappingRule) -> Result<Arc<SourceGlob>> {
        if let Some(glob) = self.globs.get(rule.source()) {
            return Ok(Arc::clone(glob.value()));
        }

        self.globs
            .entry(rule.source().to_string())
            .or_try_insert_with(|| SourceGlob::compile(rule.source()).map(Arc::new))
            .map(|glob| Arc::clone(glob.value()))
    }

    pub fn translation_template(&self, rule: &FileMappingRule) -> Result<Arc<TranslationTemplate>> {
        if let Some(template) = self.templates.get(rule.translation()) {
            return Ok(Arc::clone(template.value()));
        }

        self.templates
            .entry(rule.translation().to_string())
            .or_try_insert_with(|| {
                tracing::debug!(template = rule.translation(), "compiling translation matcher");
                TranslationTemplate::compile(rule.translation()).map(Arc::new)
            })
            .map(|template| Arc::clone(template.value()))
    }

    /// Lazily walks `root` and yields every file matching `rule.source`.
    ///
    /// Order is the walk order (file-name sorted per directory). Calling again
    /// restarts the walk.
    pub fn expand_sources<'a>(
        &'a self,
        rule: &FileMappingRule,
        root: &'a Path,
        cancel: &CancellationToken,
    ) -> Result<SourceFiles<'a>> {
        Ok(SourceFiles {
            walk: self.file_system.walk(root),
            glob: self.source_glob(rule)?,
            root,
            cancel: cancel.clone(),
            finished: false,
        })
    }

    /// Whether `path` would be yielded by [`expand_sources`](Self::expand_sources),
    /// answered without walking the tree.
    pub fn is_source(&self, rule: &FileMappingRule, root: &Path, path: &Path) -> Result<bool> {
        let Some(project_path) = ProjectPath::from_local(root, path) else {
            return Ok(false);
        };

        Ok(!is_ignored(&project_path)
            && self.source_glob(rule)?.is_match(&project_path)
            && self.file_system.is_file(path))
    }

    pub fn expand_translation_path(
        &self,
        rule: &FileMappingRule,
        source: &ProjectPath,
        language: &Language,
    ) -> Result<ProjectPath> {
        self.translation_template(rule)?.expand(source, language)
    }

    pub fn match_translation_path(
        &self,
        rule: &FileMappingRule,
        candidate: &ProjectPath,
        languages: &[Language],
    ) -> Result<Option<(SourceHint, Language)>> {
        Ok(self
            .translation_template(rule)?
            .match_path(candidate, languages))
    }
}

/// Iterator returned by [`PatternEngine::expand_sources`].
///
/// Walk errors are yielded rather than skipped. After cancellation it yields
/// one `Err(SyncError::Cancelled)` and then ends.
pub struct SourceFiles<'a> {
    walk: FileWalk<'a>,
    glob: Arc<SourceGlob>,
    root: &'a Path,
    cancel: CancellationToken,
    finished: bool,
}

impl Iterator for SourceFiles<'_> {
    type Item = Result<ProjectPath>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.cancel.is_cancelled() {
                self.finished = true;
                return Some(Err(SyncError::Cancelled));
            }

            match self.walk.next()? {
                Ok(path) => {
                    if let Some(project_path) = ProjectPath::from_local(self.root, &path)
                        && !is_ignored(&project_path)
                        && self.glob.is_match(&project_path)
                    {
                        return Some(Ok(project_path));
                    }
                }
                Err(error) => return Some(Err(error.into())),
            }
        }
    }
}
