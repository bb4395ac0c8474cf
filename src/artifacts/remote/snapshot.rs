//! Point-in-time view of a remote project's structure for one branch.

use crate::artifacts::branch::remote_branch::Branch;
use crate::artifacts::paths::project_path::ProjectPath;
use crate::artifacts::remote::language::Language;
use chrono::{DateTime, Utc};
use derive_new::new;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RemoteFile {
    pub id: u64,
    /// Path inside its branch (or the project root for trunk files).
    pub path: ProjectPath,
    pub branch_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RemoteDirectory {
    pub id: u64,
    pub path: ProjectPath,
    pub branch_id: Option<u64>,
}

/// Snapshot of branches, directories, files and languages.
///
/// Built once by [`ProjectCache`](crate::areas::project_cache::ProjectCache)
/// and shared behind an `Arc`; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    branches: HashMap<String, Branch>,
    directories: Vec<RemoteDirectory>,
    files: Vec<RemoteFile>,
    languages: Vec<Language>,
    manager_access: bool,
    fetched_at: DateTime<Utc>,
}

impl ProjectSnapshot {
    pub fn new(
        branches: Vec<Branch>,
        directories: Vec<RemoteDirectory>,
        files: Vec<RemoteFile>,
        languages: Vec<Language>,
        manager_access: bool,
    ) -> Self {
        Self {
            branches: branches
                .into_iter()
                .map(|branch| (branch.name.clone(), branch))
                .collect(),
            directories,
            files,
            languages,
            manager_access,
            fetched_at: Utc::now(),
        }
    }

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.values()
    }

    pub fn directories(&self) -> &[RemoteDirectory] {
        &self.directories
    }

    /// Files belonging to `branch_id` (`None` = trunk), keyed by path.
    pub fn files_in(&self, branch_id: Option<u64>) -> HashMap<&ProjectPath, &RemoteFile> {
        self.files
            .iter()
            .filter(|file| file.branch_id == branch_id)
            .map(|file| (&file.path, file))
            .collect()
    }

    pub fn files(&self) -> &[RemoteFile] {
        &self.files
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn has_manager_access(&self) -> bool {
        self.manager_access
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
