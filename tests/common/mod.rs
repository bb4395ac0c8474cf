#![allow(dead_code)]

pub mod host;
pub mod remote;

use assert_fs::TempDir;
use assert_fs::prelude::{FileWriteStr, PathChild};
use crowdin_sync::artifacts::config::configuration::Configuration;
use crowdin_sync::artifacts::config::file_mapping_rule::FileMappingRule;
use crowdin_sync::artifacts::remote::language::Language;
use rstest::fixture;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness; `RUST_LOG` selects levels.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn languages() -> Vec<Language> {
    vec![
        Language::from_locale("fr", "French", "fr-FR"),
        Language::from_locale("de", "German", "de-DE"),
        Language::from_locale("pt-BR", "Portuguese, Brazilian", "pt-BR"),
    ]
}

pub fn french() -> Language {
    languages().remove(0)
}

pub fn rule(source: &str, translation: &str) -> FileMappingRule {
    FileMappingRule::new(source, translation).expect("valid test rule")
}

pub fn configuration(name: &str, project_id: u64, files: Vec<FileMappingRule>) -> Configuration {
    Configuration {
        name: name.to_string(),
        project_id,
        api_token: format!("token-{project_id}"),
        base_url: None,
        branching_enabled: true,
        preserve_hierarchy: true,
        debug: false,
        auto_upload: true,
        files,
    }
}

/// A project with JSON sources under `src/`, Android resources under `app/`
/// and one French translation already downloaded.
#[fixture]
pub fn project_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");

    for (path, content) in [
        ("src/app/en.json", "{}"),
        ("src/en.json", "{}"),
        ("src/app/notes.txt", "notes"),
        ("app/res/values/strings.xml", "<resources/>"),
        ("trans/fr/en.json", "{}"),
        (".git/HEAD", "ref: refs/heads/main"),
    ] {
        dir.child(path)
            .write_str(content)
            .expect("Failed to write project file");
    }

    dir
}
