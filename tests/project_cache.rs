use crowdin_sync::areas::project_cache::ProjectCache;
use crowdin_sync::artifacts::branch::branch_name::BranchName;
use crowdin_sync::artifacts::core::CancellationToken;
use crowdin_sync::errors::{RemoteError, SyncError};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;

use common::remote::FakeRemote;

fn main_branch() -> BranchName {
    BranchName::try_parse("main").unwrap()
}

fn remote() -> FakeRemote {
    FakeRemote::new(1)
        .with_branch(7, "main")
        .with_file(1, "/src/en.json", None)
        .with_file(2, "/src/en.json", Some(7))
        .with_latency(Duration::from_millis(30))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_share_a_single_fetch() {
    common::init_tracing();
    let cache = Arc::new(ProjectCache::new());
    let remote = Arc::new(remote());

    let tasks = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let remote = Arc::clone(&remote);
            tokio::spawn(async move {
                cache
                    .get(remote.as_ref(), "app", &main_branch(), false, &CancellationToken::new())
                    .await
            })
        })
        .collect::<Vec<_>>();

    let snapshots = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect::<Vec<_>>();

    assert_eq!(remote.calls.branches(), 1);
    assert!(snapshots.iter().all(|snapshot| Arc::ptr_eq(snapshot, &snapshots[0])));
    assert_eq!(snapshots[0].files_in(Some(7)).len(), 1);
    let stats = cache.stats();
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.hits + stats.coalesced, 7);
}

#[tokio::test]
async fn invalidated_branch_is_fetched_again() {
    let cache = ProjectCache::new();
    let remote = remote();
    let cancel = CancellationToken::new();

    let before = cache.get(&remote, "app", &main_branch(), false, &cancel).await.unwrap();
    cache.invalidate(&main_branch());
    let after = cache.get(&remote, "app", &main_branch(), false, &cancel).await.unwrap();

    assert_eq!(remote.calls.branches(), 2);
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(after.fetched_at() >= before.fetched_at());
}

#[tokio::test]
async fn snapshot_is_fetched_concurrently_after_the_branch_table() {
    let cache = ProjectCache::new();
    let remote = remote();

    let snapshot = cache
        .get(&remote, "app", &BranchName::trunk(), false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(remote.calls.total(), 5);
    assert!(snapshot.has_manager_access());
    assert_eq!(snapshot.languages().len(), 3);
    assert_eq!(snapshot.files().len(), 1);
    assert_eq!(snapshot.directories().len(), 1);
}

#[tokio::test]
async fn waiter_takes_over_when_the_leader_is_cancelled() {
    let cache = ProjectCache::new();
    let remote = remote();
    let leader_cancel = CancellationToken::new();
    let leader_branch = main_branch();
    let waiter_branch = main_branch();
    let waiter_cancel = CancellationToken::new();

    let (leader, waiter, _) = futures::join!(
        cache.get(&remote, "app", &leader_branch, false, &leader_cancel),
        cache.get(&remote, "app", &waiter_branch, false, &waiter_cancel),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            leader_cancel.cancel();
        }
    );

    assert!(matches!(leader, Err(SyncError::Cancelled)));
    assert!(waiter.is_ok());
    assert_eq!(remote.calls.branches(), 2);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn cancelled_waiter_leaves_before_the_leader_finishes() {
    let cache = ProjectCache::new();
    let remote = remote().with_latency(Duration::from_millis(200));
    let waiter_cancel = CancellationToken::new();
    let leader_branch = main_branch();
    let leader_cancel = CancellationToken::new();

    let (leader, (waiter, waited), _) = futures::join!(
        cache.get(&remote, "app", &leader_branch, false, &leader_cancel),
        async {
            let started = Instant::now();
            let result = cache.get(&remote, "app", &main_branch(), false, &waiter_cancel).await;
            (result, started.elapsed())
        },
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waiter_cancel.cancel();
        }
    );

    assert!(leader.is_ok());
    assert!(matches!(waiter, Err(SyncError::Cancelled)));
    assert!(waited < Duration::from_millis(200), "waiter blocked for {waited:?}");
    assert_eq!(remote.calls.branches(), 1);
    assert_eq!(cache.stats().coalesced, 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn failure_leaves_the_previous_snapshot_in_place() {
    let cache = ProjectCache::new();
    let remote = remote();
    let cancel = CancellationToken::new();

    let cached = cache.get(&remote, "app", &main_branch(), false, &cancel).await.unwrap();
    remote.fail_next(RemoteError::new(401, "unauthorized"));
    let forced = cache.get(&remote, "app", &main_branch(), true, &cancel).await;
    let again = cache.get(&remote, "app", &main_branch(), false, &cancel).await.unwrap();

    assert!(matches!(forced, Err(SyncError::Remote(RemoteError { code: 401, .. }))));
    assert!(Arc::ptr_eq(&cached, &again));
}

#[tokio::test]
async fn configurations_do_not_share_snapshots() {
    let cache = ProjectCache::new();
    let remote = remote();
    let cancel = CancellationToken::new();

    let app = cache.get(&remote, "app", &main_branch(), false, &cancel).await.unwrap();
    let lib = cache.get(&remote, "lib", &main_branch(), false, &cancel).await.unwrap();

    assert!(!Arc::ptr_eq(&app, &lib));
    assert_eq!(cache.len(), 2);
}
