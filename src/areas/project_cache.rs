//! Per-branch cache of remote project structure
//!
//! Snapshots are keyed by (connection signature, configuration name, branch
//! name) and kept in an LRU. At most one fetch per key is in flight: the
//! first caller leads, later callers subscribe to its broadcast and receive
//! the same `Arc`.
//!
//! Each branch carries an epoch. [`ProjectCache::invalidate`] bumps it, and a
//! leader only stores its snapshot if the epoch it started under is still
//! current.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::CancellationToken;
use crate::artifacts::remote::snapshot::ProjectSnapshot;
use crate::artifacts::remote::{ConnectionSignature, RemoteConnection};
use crate::errors::{RemoteError, Result, SyncError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info};

pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(16).expect("16 is non-zero");

type FlightResult = std::result::Result<Arc<ProjectSnapshot>, RemoteError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub signature: ConnectionSignature,
    pub configuration: String,
    pub branch: BranchName,
}

/// Counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Remote fetches started (one per leader).
    pub fetches: u64,
    /// Lookups answered from the LRU.
    pub hits: u64,
    /// Lookups that waited on another caller's fetch.
    pub coalesced: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fetches: AtomicU64,
    hits: AtomicU64,
    coalesced: AtomicU64,
}

struct Snapshots {
    entries: LruCache<CacheKey, Arc<ProjectSnapshot>>,
    epochs: HashMap<BranchName, u64>,
}

impl Snapshots {
    fn epoch(&self, branch: &BranchName) -> u64 {
        self.epochs.get(branch).copied().unwrap_or_default()
    }
}

struct Flight {
    id: u64,
    sender: broadcast::Sender<FlightResult>,
}

enum Attach<'a> {
    Cached(Arc<ProjectSnapshot>),
    Waiter(broadcast::Receiver<FlightResult>),
    Leader(FlightGuard<'a>),
}

pub struct ProjectCache {
    snapshots: Mutex<Snapshots>,
    in_flight: DashMap<CacheKey, Flight>,
    next_flight: AtomicU64,
    counters: Counters,
}

impl Default for ProjectCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            snapshots: Mutex::new(Snapshots {
                entries: LruCache::new(capacity),
                epochs: HashMap::new(),
            }),
            in_flight: DashMap::new(),
            next_flight: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    /// Returns the snapshot for `branch_name`, fetching it when it is not
    /// cached or `force_refresh` is set.
    ///
    /// A forced lookup still joins a fetch that is already in flight, since
    /// that fetch started after the caller asked. If the leader of a joined
    /// fetch is cancelled, waiters start over. A cancelled waiter returns
    /// `Cancelled` without waiting for the leader, which keeps fetching.
    pub async fn get(
        &self,
        connection: &dyn RemoteConnection,
        configuration_name: &str,
        branch_name: &BranchName,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<Arc<ProjectSnapshot>> {
        let key = CacheKey {
            signature: connection.signature(),
            configuration: configuration_name.to_string(),
            branch: branch_name.clone(),
        };

        loop {
            cancel.check()?;

            match self.attach(&key, force_refresh) {
                Attach::Cached(snapshot) => {
                    debug!(configuration = configuration_name, branch = %branch_name, "project snapshot cache hit");
                    return Ok(snapshot);
                }
                Attach::Waiter(mut receiver) => {
                    debug!(configuration = configuration_name, branch = %branch_name, "waiting on in-flight fetch");
                    let received = tokio::select! {
                        received = receiver.recv() => received,
                        () = cancel.cancelled() => return Err(SyncError::Cancelled),
                    };

                    match received {
                        Ok(result) => {
                            cancel.check()?;
                            return result.map_err(SyncError::from);
                        }
                        Err(_) => {
                            debug!(branch = %branch_name, "in-flight fetch abandoned, retrying");
                            continue;
                        }
                    }
                }
                Attach::Leader(flight) => return self.lead(flight, connection, cancel).await,
            }
        }
    }

    /// Drops every snapshot of `branch_name` across all configurations.
    ///
    /// Fetches of that branch already in flight are detached: their waiters
    /// retry and their result is not stored.
    pub fn invalidate(&self, branch_name: &BranchName) {
        let dropped = {
            let mut snapshots = self.snapshots.lock();
            *snapshots.epochs.entry(branch_name.clone()).or_default() += 1;

            let stale = snapshots
                .entries
                .iter()
                .filter(|(key, _)| &key.branch == branch_name)
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>();

            for key in &stale {
                snapshots.entries.pop(key);
            }

            stale.len()
        };

        self.in_flight.retain(|key, _| &key.branch != branch_name);

        debug!(branch = %branch_name, dropped, "invalidated project snapshots");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<ProjectSnapshot>> {
        let snapshot = self.snapshots.lock().entries.get(key).cloned();

        if snapshot.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        }

        snapshot
    }

    fn attach(&self, key: &CacheKey, force_refresh: bool) -> Attach<'_> {
        if !force_refresh && let Some(snapshot) = self.cached(key) {
            return Attach::Cached(snapshot);
        }

        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(flight) => {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                Attach::Waiter(flight.get().sender.subscribe())
            }
            Entry::Vacant(vacant) => {
                // A leader may have stored its snapshot since the first check.
                if !force_refresh && let Some(snapshot) = self.cached(key) {
                    return Attach::Cached(snapshot);
                }

                let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let (sender, _) = broadcast::channel(1);
                let epoch = self.snapshots.lock().epoch(&key.branch);
                vacant.insert(Flight { id, sender });

                Attach::Leader(FlightGuard {
                    cache: self,
                    key: key.clone(),
                    id,
                    epoch,
                })
            }
        }
    }

    async fn lead(
        &self,
        flight: FlightGuard<'_>,
        connection: &dyn RemoteConnection,
        cancel: &CancellationToken,
    ) -> Result<Arc<ProjectSnapshot>> {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        info!(
            configuration = flight.key.configuration.as_str(),
            branch = %flight.key.branch,
            "fetching project snapshot"
        );

        match fetch(connection, &flight.key.branch, cancel).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                flight.complete(Ok(Arc::clone(&snapshot)));
                Ok(snapshot)
            }
            Err(SyncError::Remote(error)) => {
                flight.complete(Err(error.clone()));
                Err(SyncError::Remote(error))
            }
            // Dropping the guard closes the channel and waiters retry.
            Err(error) => Err(error),
        }
    }
}

/// Leader's claim on an in-flight key. Dropped without completing (error,
/// cancellation, or the future itself being dropped), it removes the claim.
struct FlightGuard<'a> {
    cache: &'a ProjectCache,
    key: CacheKey,
    id: u64,
    epoch: u64,
}

impl FlightGuard<'_> {
    fn complete(self, result: FlightResult) {
        if let Ok(snapshot) = &result {
            let mut snapshots = self.cache.snapshots.lock();
            if snapshots.epoch(&self.key.branch) == self.epoch {
                snapshots.entries.put(self.key.clone(), Arc::clone(snapshot));
            } else {
                debug!(branch = %self.key.branch, "branch invalidated during fetch, not storing");
            }
        }

        if let Some((_, flight)) = self.cache.in_flight.remove_if(&self.key, |_, flight| flight.id == self.id) {
            // No receivers is fine: nobody joined.
            let _ = flight.sender.send(result);
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.cache
            .in_flight
            .remove_if(&self.key, |_, flight| flight.id == self.id);
    }
}

async fn fetch(
    connection: &dyn RemoteConnection,
    branch_name: &BranchName,
    cancel: &CancellationToken,
) -> Result<ProjectSnapshot> {
    let branches = connection.list_branches().await?;
    cancel.check()?;

    let branch = branches
        .iter()
        .find(|branch| !branch_name.is_trunk() && branch.name == branch_name.as_ref())
        .cloned();
    // A named branch that does not exist yet has no content.
    let unknown_branch = !branch_name.is_trunk() && branch.is_none();

    let (directories, files, languages, manager_access) = tokio::try_join!(
        async {
            if unknown_branch {
                Ok(Vec::new())
            } else {
                connection.list_directories(branch.as_ref()).await
            }
        },
        async {
            if unknown_branch {
                Ok(Vec::new())
            } else {
                connection.list_files(branch.as_ref()).await
            }
        },
        connection.list_project_languages(),
        connection.probe_manager_access(),
    )?;
    cancel.check()?;

    Ok(ProjectSnapshot::new(
        branches,
        directories,
        files,
        languages,
        manager_access,
    ))
}
