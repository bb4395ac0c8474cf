//! Error types for the crate
//!
//! Every fallible operation returns [`SyncError`]. "Not applicable" answers
//! (a file that is not a managed translation, a file no configuration owns)
//! are `Option::None`, never errors.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Failure reported by a [`RemoteConnection`](crate::artifacts::remote::RemoteConnection).
///
/// Opaque passthrough of the transport's code and message. `Clone` so a
/// single fetch failure can be shared with every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote error {code}: {message}")]
pub struct RemoteError {
    pub code: u16,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A configuration that could not be resolved into a usable [`Configuration`](crate::artifacts::config::configuration::Configuration).
///
/// `configuration` is empty when the problem was found outside a named
/// configuration (a rule compiled on its own).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub configuration: String,
    pub problems: Vec<String>,
}

impl ConfigurationError {
    pub fn single(configuration: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            problems: vec![problem.into()],
        }
    }

    pub fn in_configuration(mut self, configuration: &str) -> Self {
        self.configuration = configuration.to_string();
        self
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.configuration.is_empty() {
            write!(f, "configuration has errors:")?;
        } else {
            write!(f, "configuration '{}' has errors:", self.configuration)?;
        }

        for problem in &self.problems {
            write!(f, "\n  - {problem}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("branch name '{name}' contains forbidden symbols")]
    InvalidBranchName { name: String },

    #[error("branch '{name}' does not exist in the remote project")]
    BranchNotFound { name: String },

    #[error("{} is not tracked by any file mapping rule", .path.display())]
    SourceNotTracked { path: PathBuf },

    #[error("source file {path} has not been uploaded yet")]
    RemoteFileMissing { path: String },

    #[error("placeholder %{placeholder}% has no value for language '{language}'")]
    PlaceholderResolution {
        placeholder: &'static str,
        language: String,
    },

    #[error("manager access to the remote project is required for this action")]
    ManagerAccessRequired,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Cancellation is not a failure: callers exit without a message.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}
