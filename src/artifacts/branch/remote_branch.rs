use chrono::{DateTime, Utc};
use derive_new::new;

/// Branch as the remote project knows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct Branch {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of resolving a [`BranchName`](super::branch_name::BranchName) against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBranch {
    /// No branching: files live at the project root.
    Trunk,
    /// The branch already existed remotely.
    Found(Branch),
    /// The branch was created by this resolution.
    Created(Branch),
}

impl ResolvedBranch {
    pub fn branch(&self) -> Option<&Branch> {
        match self {
            ResolvedBranch::Trunk => None,
            ResolvedBranch::Found(branch) | ResolvedBranch::Created(branch) => Some(branch),
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.branch().map(|branch| branch.id)
    }
}
