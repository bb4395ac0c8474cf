pub mod remote_branch;
pub mod branch_name;

/// Characters the remote project refuses in branch names, plus control characters.
pub const INVALID_BRANCH_NAME_REGEX: &str = r#"[/\\:\*\?"<>\|\x00-\x1f\x7f]"#;
