//! Stateful components of a sync session
//!
//! - `workspace`: local file system access and directory walking
//! - `notifier`: user-visible message sink of the host
//! - `pattern_engine`: source glob expansion and translation path mapping
//! - `project_cache`: coalescing, LRU-capped cache of remote project snapshots
//! - `branches`: branch name selection and remote branch resolution
//! - `resolver`: local file to remote file and translation to source lookups
//! - `session`: orchestration entry point for the host

pub mod branches;
pub mod notifier;
pub mod pattern_engine;
pub mod project_cache;
pub mod resolver;
pub mod session;
pub mod workspace;
