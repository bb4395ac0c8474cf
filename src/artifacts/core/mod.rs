//! Core utilities and shared types
//!
//! This module contains shared utilities used across the crate.

use crate::errors::{Result, SyncError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cooperative cancellation flag shared between the host and a running task.
///
/// The host flips it with [`cancel`](Self::cancel); long-running work polls it
/// between remote calls and on each file-tree step. Clones share the flag.
///
/// ## Usage
///
/// ```ignore
/// let cancel = CancellationToken::new();
/// let task = tokio::spawn(session.warm_up(collaborators, cancel.clone()));
/// cancel.cancel();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(SyncError::Cancelled)` once the host has cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the host has cancelled. Meant to be raced against a
    /// wait that does not poll the flag itself.
    pub async fn cancelled(&self) {
        let mut interval = tokio::time::interval(CANCEL_POLL_INTERVAL);

        while !self.is_cancelled() {
            interval.tick().await;
        }
    }
}
