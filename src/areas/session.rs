//! Entry point for the host
//!
//! A session is built once per opened project from the resolved
//! configurations. It owns the pattern engine and the project cache, and
//! every operation receives the collaborators and a cancellation token
//! explicitly.

use crate::areas::branches::{BranchResolver, VcsBranchProvider};
use crate::areas::notifier::HostNotifier;
use crate::areas::pattern_engine::PatternEngine;
use crate::areas::project_cache::ProjectCache;
use crate::areas::resolver::{FileResolver, ResolvedSourceFile, TranslationOrigin};
use crate::areas::workspace::LocalFileSystem;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::remote_branch::ResolvedBranch;
use crate::artifacts::config::configuration::Configuration;
use crate::artifacts::config::loader::{ConfigurationLoader, Environment};
use crate::artifacts::core::CancellationToken;
use crate::artifacts::remote::snapshot::ProjectSnapshot;
use crate::artifacts::remote::{RemoteConnection, RemoteConnector};
use crate::errors::{Result, SyncError};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const TRANSLATION_OWNERS_CAPACITY: NonZeroUsize = NonZeroUsize::new(20).expect("20 is non-zero");

/// Everything a session operation may call out to.
#[derive(Clone)]
pub struct Collaborators {
    pub connector: Arc<dyn RemoteConnector>,
    pub vcs: Arc<dyn VcsBranchProvider>,
    pub notifier: Arc<dyn HostNotifier>,
}

/// A source file resolved for "download source".
#[derive(Debug, Clone)]
pub struct LocatedSource {
    pub configuration: String,
    pub branch: ResolvedBranch,
    pub file: ResolvedSourceFile,
    pub snapshot: Arc<ProjectSnapshot>,
}

/// A translation file resolved for "download translation".
#[derive(Debug, Clone)]
pub struct LocatedTranslation {
    pub configuration: String,
    pub branch: ResolvedBranch,
    pub origin: TranslationOrigin,
    pub source_remote_id: u64,
}

/// Per-configuration connection and branch, resolved for one operation.
struct Context<'s> {
    configuration: &'s Configuration,
    connection: Arc<dyn RemoteConnection>,
    branches: BranchResolver,
    branch_name: BranchName,
}

pub struct Session {
    root: PathBuf,
    configurations: Vec<Configuration>,
    engine: PatternEngine,
    cache: ProjectCache,
    translation_owners: Mutex<LruCache<PathBuf, usize>>,
}

impl Session {
    pub fn new(
        root: impl Into<PathBuf>,
        configurations: Vec<Configuration>,
        file_system: Arc<dyn LocalFileSystem>,
    ) -> Self {
        Self {
            root: root.into(),
            configurations,
            engine: PatternEngine::new(file_system),
            cache: ProjectCache::new(),
            translation_owners: Mutex::new(LruCache::new(TRANSLATION_OWNERS_CAPACITY)),
        }
    }

    /// Loads every named property set; the first invalid configuration
    /// aborts with its full list of problems.
    pub fn load(
        root: impl Into<PathBuf>,
        properties: &BTreeMap<String, BTreeMap<String, String>>,
        environment: &dyn Environment,
        file_system: Arc<dyn LocalFileSystem>,
    ) -> Result<Self> {
        let loader = ConfigurationLoader::new(environment);
        let configurations = properties
            .iter()
            .map(|(name, properties)| loader.load(name, properties))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::new(root, configurations, file_system))
    }

    pub fn with_cache(mut self, cache: ProjectCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn engine(&self) -> &PatternEngine {
        &self.engine
    }

    pub fn cache(&self) -> &ProjectCache {
        &self.cache
    }

    pub fn resolver(&self) -> FileResolver<'_> {
        FileResolver::new(&self.engine, &self.root)
    }

    /// Refreshes the snapshot of every configuration's current branch.
    ///
    /// A failing configuration is reported and skipped. Only cancellation
    /// stops the warm-up.
    pub async fn warm_up(&self, collaborators: &Collaborators, cancel: &CancellationToken) -> Result<()> {
        for configuration in &self.configurations {
            let refreshed = async {
                let context = self.context(configuration, collaborators)?;
                self.snapshot(&context, true, cancel).await
            }
            .await;

            match refreshed {
                Ok(snapshot) => debug!(
                    configuration = configuration.name.as_str(),
                    files = snapshot.files().len(),
                    "warmed up project cache"
                ),
                Err(error) if error.is_cancelled() => return Err(error),
                Err(error) => {
                    warn!(configuration = configuration.name.as_str(), %error, "warm-up failed");
                    collaborators.notifier.error(&format!(
                        "Failed to load project for configuration '{}': {error}",
                        configuration.name
                    ));
                }
            }
        }

        Ok(())
    }

    /// Groups changed files by the index of the first rule owning them.
    ///
    /// Files no rule owns are dropped. Empty when auto-upload is off.
    pub fn changed_sources(
        &self,
        configuration: &Configuration,
        changed_paths: &[PathBuf],
    ) -> Result<BTreeMap<usize, Vec<PathBuf>>> {
        let mut grouped: BTreeMap<usize, Vec<PathBuf>> = BTreeMap::new();

        if !configuration.auto_upload {
            return Ok(grouped);
        }

        let resolver = self.resolver();
        for path in changed_paths {
            if let Some((index, _)) = resolver.rule_for_source(configuration, path)? {
                grouped.entry(index).or_default().push(path.clone());
            }
        }

        Ok(grouped)
    }

    /// Call after an upload or any other change to the remote structure of
    /// `branch_name`.
    pub fn uploaded(&self, branch_name: &BranchName) {
        self.cache.invalidate(branch_name);
    }

    /// Resolves `local_file` to its remote source file.
    ///
    /// `Ok(None)` when no configuration owns the file. The branch is never
    /// created and the snapshot is always refreshed.
    pub async fn locate_source(
        &self,
        local_file: &Path,
        collaborators: &Collaborators,
        cancel: &CancellationToken,
    ) -> Result<Option<LocatedSource>> {
        let resolver = self.resolver();
        let mut owner = None;
        for configuration in &self.configurations {
            if resolver.rule_for_source(configuration, local_file)?.is_some() {
                owner = Some(configuration);
                break;
            }
        }
        let Some(configuration) = owner else {
            return Ok(None);
        };

        let context = self.context(configuration, collaborators)?;
        let snapshot = self.snapshot(&context, true, cancel).await?;
        let branch = self.resolve_branch(&context, &snapshot).await?;
        let file = resolver.source_identifier_for(configuration, &snapshot, &branch, local_file)?;

        Ok(Some(LocatedSource {
            configuration: configuration.name.clone(),
            branch,
            file,
            snapshot,
        }))
    }

    /// Resolves a local translation file to its source, language and the
    /// source's remote id.
    ///
    /// `Ok(None)` when no configuration manages the file. The owning
    /// configuration's snapshot is refreshed before the source is looked up.
    /// Downloading a translation needs manager access to the project.
    pub async fn locate_translation(
        &self,
        local_file: &Path,
        collaborators: &Collaborators,
        cancel: &CancellationToken,
    ) -> Result<Option<LocatedTranslation>> {
        let resolver = self.resolver();

        for index in self.owner_candidates(local_file) {
            let configuration = &self.configurations[index];
            let context = self.context(configuration, collaborators)?;
            // Only the project languages are needed to find the owner.
            let cached = self.snapshot(&context, false, cancel).await?;

            let Some(origin) =
                resolver.source_from_translation(configuration, &cached, local_file, cancel)?
            else {
                continue;
            };

            self.translation_owners.lock().put(local_file.to_path_buf(), index);
            let snapshot = self.snapshot(&context, true, cancel).await?;

            if !snapshot.has_manager_access() {
                return Err(SyncError::ManagerAccessRequired);
            }

            let branch = self.resolve_branch(&context, &snapshot).await?;
            let source = resolver.source_identifier_for(
                configuration,
                &snapshot,
                &branch,
                &origin.source.to_local(&self.root),
            )?;

            return Ok(Some(LocatedTranslation {
                configuration: configuration.name.clone(),
                branch,
                origin,
                source_remote_id: source.remote_id,
            }));
        }

        Ok(None)
    }

    /// Surfaces a failed operation as one user-visible message.
    ///
    /// Cancellation is not reported.
    pub fn report<T>(notifier: &dyn HostNotifier, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) if error.is_cancelled() => {
                debug!("operation cancelled");
                None
            }
            Err(error) => {
                warn!(%error, "operation failed");
                notifier.error(&error.to_string());
                None
            }
        }
    }

    /// Configuration indices to try for a translation file, the last known
    /// owner first.
    fn owner_candidates(&self, local_file: &Path) -> Vec<usize> {
        let known = self.translation_owners.lock().get(local_file).copied();
        let mut candidates = Vec::with_capacity(self.configurations.len());
        candidates.extend(known.filter(|index| *index < self.configurations.len()));
        candidates.extend((0..self.configurations.len()).filter(|index| Some(*index) != known));
        candidates
    }

    fn context<'s>(
        &self,
        configuration: &'s Configuration,
        collaborators: &Collaborators,
    ) -> Result<Context<'s>> {
        let branches = BranchResolver::new(Arc::clone(&collaborators.vcs));
        let branch_name = branches.resolve_name(configuration, &self.root)?;
        let connection = collaborators.connector.connect(configuration)?;

        Ok(Context {
            configuration,
            connection,
            branches,
            branch_name,
        })
    }

    async fn snapshot(
        &self,
        context: &Context<'_>,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<Arc<ProjectSnapshot>> {
        self.cache
            .get(
                context.connection.as_ref(),
                &context.configuration.name,
                &context.branch_name,
                force_refresh,
                cancel,
            )
            .await
    }

    async fn resolve_branch(&self, context: &Context<'_>, snapshot: &ProjectSnapshot) -> Result<ResolvedBranch> {
        context
            .branches
            .resolve(
                &self.cache,
                context.connection.as_ref(),
                snapshot,
                &context.branch_name,
                false,
            )
            .await
    }
}
