//! File-mapping and project-cache resolution for Crowdin sync
//!
//! Maps local source files to remote file identifiers through configured
//! glob/template rules, traces translation files back to their sources, and
//! keeps a coalescing per-branch cache of the remote project structure.
//!
//! - `areas`: stateful components (engine, cache, resolvers, session)
//! - `artifacts`: value types and the collaborator contracts
//! - `errors`: the crate error type

pub mod areas;
pub mod artifacts;
pub mod errors;

pub use areas::session::{Collaborators, Session};
pub use errors::{Result, SyncError};
