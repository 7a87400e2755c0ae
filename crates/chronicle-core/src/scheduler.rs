//! Sync scheduling.
//!
//! The scheduler owns the registry and a [`SyncProcessor`], and drives
//! two kinds of work against them: one-shot syncs fired in response to
//! watch events, and periodic sweeps over every tracked repository.
//! A per-repository async mutex guarantees at most one sync per key at
//! a time, so a one-shot landing mid-sweep queues behind it instead of
//! racing it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use chronicle_index::CommitIndex;

use crate::processor::SyncProcessor;
use crate::registry::{Registry, RepoKey};

/// Drives syncs over the tracked-repository registry.
#[derive(Debug)]
pub struct Scheduler<I> {
    registry: Registry,
    processor: SyncProcessor<I>,
    /// One lock per tracked repository. Entries are pruned during
    /// sweeps once the repository is no longer tracked, so the map
    /// never outgrows the registry for long.
    locks: StdMutex<HashMap<RepoKey, Arc<Mutex<()>>>>,
}

impl<I: CommitIndex + 'static> Scheduler<I> {
    /// Create a scheduler over an empty registry.
    pub fn new(processor: SyncProcessor<I>) -> Self {
        Self {
            registry: Registry::new(),
            processor,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// The registry this scheduler sweeps over.
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The processor, mainly for inspection in tests.
    pub const fn processor(&self) -> &SyncProcessor<I> {
        &self.processor
    }

    fn lock_for(&self, key: &RepoKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Drop locks for repositories that are no longer tracked.
    fn prune_locks(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|key, lock| {
            // A lock still in use elsewhere is kept even for a removed
            // repository; the next prune gets it.
            Arc::strong_count(lock) > 1 || self.registry.get(key).is_some()
        });
    }

    /// Sync one repository now, serialized against any other sync of
    /// the same key. The descriptor is re-read from the registry under
    /// the lock so a stale event cannot resurrect a deleted repository.
    ///
    /// Returns the number of commits published, or `None` when the key
    /// is no longer tracked.
    pub async fn sync_one(&self, key: &RepoKey) -> Option<usize> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let repo = self.registry.get(key)?;
        match self.processor.sync(&repo).await {
            Ok(published) => Some(published),
            Err(e) => {
                error!(repo = %key, error = %e, "sync failed");
                Some(0)
            }
        }
    }

    /// Fire a one-shot background sync for `key`.
    pub fn schedule_now(self: &Arc<Self>, key: RepoKey) {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            debug!(repo = %key, "one-shot sync");
            scheduler.sync_one(&key).await;
        });
    }

    /// Sweep every tracked repository once, sequentially.
    ///
    /// Failures are repository-scoped: a broken clone URL or index
    /// rejection for one repository never stops the others from
    /// syncing. Returns the total number of commits published.
    pub async fn sweep(&self) -> usize {
        self.prune_locks();

        let mut total = 0;
        for repo in self.registry.snapshot() {
            if let Some(published) = self.sync_one(&repo.key).await {
                total += published;
            }
        }
        if total > 0 {
            info!(published = total, "sweep complete");
        }
        total
    }

    /// Sweep forever, waiting `interval` between rounds. Never returns;
    /// run it on its own task.
    pub async fn run_sweeps(self: Arc<Self>, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;
            self.sweep().await;
        }
    }
}
