//! Data structures and algorithms
//!
//! - `branch`: branch names, remote branches and resolution outcomes
//! - `config`: configurations, mapping rules and the property loader
//! - `core`: shared utilities (cancellation)
//! - `paths`: canonical root-relative paths
//! - `pattern`: source globs and translation templates
//! - `remote`: the remote connection contract and project snapshots

pub mod branch;
pub mod config;
pub mod core;
pub mod paths;
pub mod pattern;
pub mod remote;
