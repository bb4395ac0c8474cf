//! Configuration model
//!
//! - `configuration`: a resolved configuration and its mapping rules
//! - `file_mapping_rule`: one source glob + translation template pair
//! - `loader`: validation of raw properties into a configuration

pub mod configuration;
pub mod file_mapping_rule;
pub mod loader;
