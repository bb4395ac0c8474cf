use crate::artifacts::config::file_mapping_rule::FileMappingRule;
use std::fmt;

/// A resolved configuration: project credentials, behaviour flags and the
/// ordered mapping rules. Rule order is significant: the first rule that
/// claims a file wins.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    pub name: String,
    pub project_id: u64,
    pub api_token: String,
    pub base_url: Option<String>,
    pub branching_enabled: bool,
    pub preserve_hierarchy: bool,
    pub debug: bool,
    pub auto_upload: bool,
    pub files: Vec<FileMappingRule>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("name", &self.name)
            .field("project_id", &self.project_id)
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("branching_enabled", &self.branching_enabled)
            .field("preserve_hierarchy", &self.preserve_hierarchy)
            .field("debug", &self.debug)
            .field("auto_upload", &self.auto_upload)
            .field("files", &self.files)
            .finish()
    }
}
