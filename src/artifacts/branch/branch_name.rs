use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::SyncError;
use regex::Regex;
use std::sync::LazyLock;

static INVALID_BRANCH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(INVALID_BRANCH_NAME_REGEX).expect("branch name denylist compiles"));

/// Name of a remote branch mirroring a local VCS branch.
///
/// The empty name is the trunk: branching is disabled or the VCS reported no
/// current branch, and files live at the project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn trunk() -> Self {
        Self(String::new())
    }

    pub fn try_parse(name: impl Into<String>) -> Result<Self, SyncError> {
        let name = name.into();

        if INVALID_BRANCH_NAME.is_match(&name) {
            Err(SyncError::InvalidBranchName { name })
        } else {
            Ok(Self(name))
        }
    }

    pub fn is_trunk(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
