use async_trait::async_trait;
use chrono::Utc;
use crowdin_sync::artifacts::branch::remote_branch::Branch;
use crowdin_sync::artifacts::config::configuration::Configuration;
use crowdin_sync::artifacts::paths::project_path::ProjectPath;
use crowdin_sync::artifacts::remote::language::Language;
use crowdin_sync::artifacts::remote::snapshot::{RemoteDirectory, RemoteFile};
use crowdin_sync::artifacts::remote::{ConnectionSignature, RemoteConnection, RemoteConnector};
use crowdin_sync::errors::{RemoteError, SyncError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Calls {
    pub list_branches: AtomicUsize,
    pub create_branch: AtomicUsize,
    pub list_directories: AtomicUsize,
    pub list_files: AtomicUsize,
    pub list_project_languages: AtomicUsize,
    pub probe_manager_access: AtomicUsize,
}

impl Calls {
    pub fn branches(&self) -> usize {
        self.list_branches.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        [
            &self.list_branches,
            &self.create_branch,
            &self.list_directories,
            &self.list_files,
            &self.list_project_languages,
            &self.probe_manager_access,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }
}

/// In-memory remote project. Every call is counted and delayed by `latency`.
pub struct FakeRemote {
    project_id: u64,
    branches: Mutex<Vec<Branch>>,
    files: Mutex<Vec<RemoteFile>>,
    languages: Vec<Language>,
    manager_access: bool,
    latency: Duration,
    failure: Mutex<Option<RemoteError>>,
    pub calls: Calls,
}

impl FakeRemote {
    pub fn new(project_id: u64) -> Self {
        Self {
            project_id,
            branches: Mutex::new(Vec::new()),
            files: Mutex::new(Vec::new()),
            languages: crate::common::languages(),
            manager_access: true,
            latency: Duration::from_millis(5),
            failure: Mutex::new(None),
            calls: Calls::default(),
        }
    }

    pub fn with_branch(self, id: u64, name: &str) -> Self {
        self.branches
            .lock()
            .push(Branch::new(id, name.to_string(), Utc::now()));
        self
    }

    pub fn with_file(self, id: u64, path: &str, branch_id: Option<u64>) -> Self {
        self.upload(id, path, branch_id);
        self
    }

    /// Adds a file as if another client had just uploaded it.
    pub fn upload(&self, id: u64, path: &str, branch_id: Option<u64>) {
        self.files
            .lock()
            .push(RemoteFile::new(id, ProjectPath::parse(path), branch_id));
    }

    pub fn with_manager_access(mut self, manager_access: bool) -> Self {
        self.manager_access = manager_access;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The next `list_branches` call fails with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        *self.failure.lock() = Some(error);
    }

    async fn call(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
    }
}

#[async_trait]
impl RemoteConnection for FakeRemote {
    fn signature(&self) -> ConnectionSignature {
        ConnectionSignature::new(self.project_id, &format!("token-{}", self.project_id), None)
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, RemoteError> {
        self.call(&self.calls.list_branches).await;

        if let Some(error) = self.failure.lock().take() {
            return Err(error);
        }

        Ok(self.branches.lock().clone())
    }

    async fn create_branch(&self, name: &str) -> Result<Branch, RemoteError> {
        self.call(&self.calls.create_branch).await;

        let mut branches = self.branches.lock();
        let branch = Branch::new(100 + branches.len() as u64, name.to_string(), Utc::now());
        branches.push(branch.clone());

        Ok(branch)
    }

    async fn list_directories(
        &self,
        branch: Option<&Branch>,
    ) -> Result<Vec<RemoteDirectory>, RemoteError> {
        self.call(&self.calls.list_directories).await;

        let branch_id = branch.map(|branch| branch.id);
        Ok(self
            .files
            .lock()
            .iter()
            .filter(|file| file.branch_id == branch_id && !file.path.parent().is_root())
            .map(|file| RemoteDirectory::new(file.id * 10, file.path.parent(), branch_id))
            .collect())
    }

    async fn list_files(&self, branch: Option<&Branch>) -> Result<Vec<RemoteFile>, RemoteError> {
        self.call(&self.calls.list_files).await;

        let branch_id = branch.map(|branch| branch.id);
        Ok(self
            .files
            .lock()
            .iter()
            .filter(|file| file.branch_id == branch_id)
            .cloned()
            .collect())
    }

    async fn list_project_languages(&self) -> Result<Vec<Language>, RemoteError> {
        self.call(&self.calls.list_project_languages).await;
        Ok(self.languages.clone())
    }

    async fn probe_manager_access(&self) -> Result<bool, RemoteError> {
        self.call(&self.calls.probe_manager_access).await;
        Ok(self.manager_access)
    }
}

/// Hands out the registered remote for a configuration's project id.
#[derive(Default)]
pub struct FakeConnector {
    remotes: HashMap<u64, Arc<FakeRemote>>,
    pub connects: AtomicUsize,
}

impl FakeConnector {
    pub fn with_remote(mut self, remote: Arc<FakeRemote>) -> Self {
        self.remotes.insert(remote.project_id, remote);
        self
    }
}

impl RemoteConnector for FakeConnector {
    fn connect(&self, configuration: &Configuration) -> crowdin_sync::Result<Arc<dyn RemoteConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        match self.remotes.get(&configuration.project_id) {
            Some(remote) => Ok(Arc::clone(remote) as Arc<dyn RemoteConnection>),
            None => Err(SyncError::Remote(RemoteError::new(
                404,
                format!("project {} not found", configuration.project_id),
            ))),
        }
    }
}
