use assert_fs::TempDir;
use crowdin_sync::areas::pattern_engine::PatternEngine;
use crowdin_sync::areas::project_cache::ProjectCache;
use crowdin_sync::areas::resolver::{FileResolver, TranslationOrigin};
use crowdin_sync::areas::workspace::Workspace;
use crowdin_sync::artifacts::branch::branch_name::BranchName;
use crowdin_sync::artifacts::branch::remote_branch::ResolvedBranch;
use crowdin_sync::artifacts::core::CancellationToken;
use crowdin_sync::artifacts::paths::project_path::ProjectPath;
use crowdin_sync::errors::SyncError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

mod common;

use common::remote::FakeRemote;
use common::{configuration, french, project_dir, rule};

fn engine() -> PatternEngine {
    PatternEngine::new(Arc::new(Workspace))
}

#[rstest]
#[tokio::test]
async fn unpushed_source_is_missing_remotely_not_untracked(
    project_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let resolver = FileResolver::new(&engine, project_dir.path());
    let configuration = configuration(
        "web",
        1,
        vec![rule("/src/**/*.json", "/trans/%two_letters%/%original_file_name%")],
    );
    let remote = FakeRemote::new(1).with_file(1, "/src/en.json", None);
    let snapshot = ProjectCache::new()
        .get(&remote, "web", &BranchName::trunk(), false, &CancellationToken::new())
        .await?;

    let pushed = resolver.source_identifier_for(
        &configuration,
        &snapshot,
        &ResolvedBranch::Trunk,
        &project_dir.path().join("src/en.json"),
    )?;
    let unpushed = resolver.source_identifier_for(
        &configuration,
        &snapshot,
        &ResolvedBranch::Trunk,
        &project_dir.path().join("src/app/en.json"),
    );
    let untracked = resolver.source_identifier_for(
        &configuration,
        &snapshot,
        &ResolvedBranch::Trunk,
        &project_dir.path().join("src/app/notes.txt"),
    );

    assert_eq!(pushed.remote_id, 1);
    assert!(matches!(unpushed, Err(SyncError::RemoteFileMissing { path }) if path == "/src/app/en.json"));
    assert!(matches!(untracked, Err(SyncError::SourceNotTracked { path }) if path.ends_with("notes.txt")));

    Ok(())
}

#[rstest]
#[tokio::test]
async fn translation_resolves_to_its_source(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let resolver = FileResolver::new(&engine, project_dir.path());
    let configuration = configuration(
        "web",
        1,
        vec![rule("/src/**/*.json", "/trans/%two_letters%/%original_file_name%")],
    );
    let remote = FakeRemote::new(1);
    let snapshot = ProjectCache::new()
        .get(&remote, "web", &BranchName::trunk(), false, &CancellationToken::new())
        .await?;

    let origin = resolver.source_from_translation(
        &configuration,
        &snapshot,
        &project_dir.path().join("trans/fr/en.json"),
        &CancellationToken::new(),
    )?;

    assert_eq!(
        origin,
        Some(TranslationOrigin::new(ProjectPath::parse("/src/app/en.json"), french(), 0))
    );

    Ok(())
}

#[rstest]
fn first_matching_rule_owns_a_source(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let resolver = FileResolver::new(&engine, project_dir.path());
    let configuration = configuration(
        "web",
        1,
        vec![
            rule("/src/app/*", "/%locale%/%original_file_name%"),
            rule("/src/**/*.json", "/trans/%two_letters%/%original_file_name%"),
        ],
    );

    let app = resolver.rule_for_source(&configuration, &project_dir.path().join("src/app/en.json"))?;
    let root = resolver.rule_for_source(&configuration, &project_dir.path().join("src/en.json"))?;
    let outside = resolver.rule_for_source(&configuration, &project_dir.path().join("trans/fr/en.json"))?;

    assert_eq!(app.map(|(index, _)| index), Some(0));
    assert_eq!(root.map(|(index, _)| index), Some(1));
    assert!(outside.is_none());

    Ok(())
}

#[rstest]
fn every_target_language_gets_a_translation_path(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine();
    let resolver = FileResolver::new(&engine, project_dir.path());
    let rule = rule("/src/**/*.json", "/trans/%locale%/%original_path%/%original_file_name%")
        .with_excluded_target_languages(["pt-BR".to_string()]);

    let targets = resolver.translation_targets(&rule, &ProjectPath::parse("/src/app/en.json"), &common::languages())?;

    assert_eq!(
        targets.into_iter().map(|(language, path)| (language.id, path)).collect::<Vec<_>>(),
        vec![
            ("fr".to_string(), ProjectPath::parse("/trans/fr-FR/src/app/en.json")),
            ("de".to_string(), ProjectPath::parse("/trans/de-DE/src/app/en.json")),
        ]
    );

    Ok(())
}
