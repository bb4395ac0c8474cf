use crate::areas::project_cache::ProjectCache;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::remote_branch::ResolvedBranch;
use crate::artifacts::config::configuration::Configuration;
use crate::artifacts::remote::RemoteConnection;
use crate::artifacts::remote::snapshot::ProjectSnapshot;
use crate::errors::{Result, SyncError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Reports the current VCS branch of a project.
pub trait VcsBranchProvider: Send + Sync {
    /// `""` when the project has no VCS or no current branch.
    fn current_branch_name(&self, project_root: &Path) -> String;
}

/// Provider for projects without version control: always the trunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVcs;

impl VcsBranchProvider for NoVcs {
    fn current_branch_name(&self, _project_root: &Path) -> String {
        String::new()
    }
}

pub struct BranchResolver {
    vcs: Arc<dyn VcsBranchProvider>,
}

impl BranchResolver {
    pub fn new(vcs: Arc<dyn VcsBranchProvider>) -> Self {
        Self { vcs }
    }

    /// The branch name a configuration works on.
    ///
    /// Validation happens here, before anything is sent to the remote.
    pub fn resolve_name(&self, configuration: &Configuration, project_root: &Path) -> Result<BranchName> {
        if !configuration.branching_enabled {
            return Ok(BranchName::trunk());
        }

        let name = BranchName::try_parse(self.vcs.current_branch_name(project_root))?;
        debug!(configuration = configuration.name.as_str(), branch = %name, "selected branch");

        Ok(name)
    }

    /// Looks `name` up in `snapshot`, creating it remotely when allowed.
    ///
    /// A created branch is invalidated in `cache` so the next lookup fetches
    /// a branch table that contains it.
    pub async fn resolve(
        &self,
        cache: &ProjectCache,
        connection: &dyn RemoteConnection,
        snapshot: &ProjectSnapshot,
        name: &BranchName,
        create_if_missing: bool,
    ) -> Result<ResolvedBranch> {
        if name.is_trunk() {
            return Ok(ResolvedBranch::Trunk);
        }

        if let Some(branch) = snapshot.branch(name.as_ref()) {
            return Ok(ResolvedBranch::Found(branch.clone()));
        }

        if !create_if_missing {
            return Err(SyncError::BranchNotFound {
                name: name.to_string(),
            });
        }

        let branch = connection.create_branch(name.as_ref()).await?;
        info!(branch = %name, id = branch.id, "created remote branch");
        cache.invalidate(name);

        Ok(ResolvedBranch::Created(branch))
    }
}
