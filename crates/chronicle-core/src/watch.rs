//! Watch-event intake.
//!
//! Upstream something watches the set of repositories that should be
//! indexed and emits add/update/delete events. This module applies
//! those events to the scheduler's registry and fires the follow-up
//! one-shot syncs. The feed itself is just an mpsc channel so any
//! source (a config file at startup, an HTTP watch stream, a test) can
//! drive the same code path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use chronicle_index::CommitIndex;

use crate::registry::{RepoKey, TrackedRepo};
use crate::scheduler::Scheduler;

/// A change to the set of tracked repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A repository appeared; start tracking and sync it.
    Added(TrackedRepo),
    /// A tracked repository's descriptor changed; replace it wholesale
    /// and re-sync.
    Modified(TrackedRepo),
    /// A repository went away; stop tracking it. Already-published
    /// documents stay in the index.
    Deleted(RepoKey),
}

/// Apply one event to the scheduler's registry, firing a one-shot sync
/// for adds and updates.
///
/// Add and update are deliberately the same operation: the registry
/// upserts, so replaying an add for an already-tracked repository just
/// refreshes its descriptor. Deleting an unknown key is a no-op.
pub fn apply_event<I: CommitIndex + 'static>(scheduler: &Arc<Scheduler<I>>, event: WatchEvent) {
    match event {
        WatchEvent::Added(repo) | WatchEvent::Modified(repo) => {
            let key = repo.key.clone();
            info!(repo = %key, branch = %repo.branch, "tracking repository");
            scheduler.registry().upsert(repo);
            scheduler.schedule_now(key);
        }
        WatchEvent::Deleted(key) => {
            if scheduler.registry().remove(&key).is_some() {
                info!(repo = %key, "repository untracked");
            } else {
                debug!(repo = %key, "delete for unknown repository ignored");
            }
        }
    }
}

/// Consume events until the sending side closes.
pub async fn run_feed<I: CommitIndex + 'static>(
    mut events: mpsc::Receiver<WatchEvent>,
    scheduler: Arc<Scheduler<I>>,
) {
    while let Some(event) = events.recv().await {
        apply_event(&scheduler, event);
    }
    debug!("watch feed closed");
}
