//! Host message sink
//!
//! The host decides how messages reach the user (balloons, a log pane); the
//! core only fires them and forgets.

use tracing::{debug, error, info};

pub trait HostNotifier: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, message: &str);

    fn debug(&self, message: &str);
}

/// Forwards every message to `tracing` under the `crowdin_sync::host` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl HostNotifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!(target: "crowdin_sync::host", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "crowdin_sync::host", "{message}");
    }

    fn debug(&self, message: &str) {
        debug!(target: "crowdin_sync::host", "{message}");
    }
}
