//! Remote project collaborator
//!
//! The transport (authentication, HTTP, DTOs) lives outside this crate. The
//! core only needs the calls below, all of which may fail with a
//! [`RemoteError`].

pub mod language;
pub mod snapshot;

use crate::artifacts::branch::remote_branch::Branch;
use crate::artifacts::config::configuration::Configuration;
use crate::artifacts::remote::language::Language;
use crate::artifacts::remote::snapshot::{RemoteDirectory, RemoteFile};
use crate::errors::{RemoteError, Result};
use async_trait::async_trait;
use sha1::{Digest, Sha1};
use std::sync::Arc;

/// Identity of a connection for cache keys: project id, base URL and a
/// fingerprint of the token, so two tokens for one project never share
/// snapshots and the token itself is never kept in a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionSignature(String);

impl ConnectionSignature {
    pub fn new(project_id: u64, api_token: &str, base_url: Option<&str>) -> Self {
        let fingerprint = Sha1::digest(api_token.as_bytes());
        Self(format!(
            "{project_id}|{fingerprint:x}|{}",
            base_url.unwrap_or_default()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait RemoteConnection: Send + Sync {
    fn signature(&self) -> ConnectionSignature;

    async fn list_branches(&self) -> std::result::Result<Vec<Branch>, RemoteError>;

    async fn create_branch(&self, name: &str) -> std::result::Result<Branch, RemoteError>;

    /// Directories of `branch`, or of the project root when `None`.
    async fn list_directories(
        &self,
        branch: Option<&Branch>,
    ) -> std::result::Result<Vec<RemoteDirectory>, RemoteError>;

    /// Files of `branch`, or of the project root when `None`.
    async fn list_files(
        &self,
        branch: Option<&Branch>,
    ) -> std::result::Result<Vec<RemoteFile>, RemoteError>;

    async fn list_project_languages(&self) -> std::result::Result<Vec<Language>, RemoteError>;

    async fn probe_manager_access(&self) -> std::result::Result<bool, RemoteError>;
}

/// Builds the connection for one configuration's project and credentials.
pub trait RemoteConnector: Send + Sync {
    fn connect(&self, configuration: &Configuration) -> Result<Arc<dyn RemoteConnection>>;
}
