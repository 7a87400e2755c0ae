//! One repository sync, end to end.
//!
//! [`SyncProcessor`] owns the index handle and the working-copy
//! directory. A sync run materializes the working copy, walks its
//! history, asks the index for the published boundary, selects the
//! missing commits and publishes them oldest-closest-first. Everything
//! touching libgit2 runs on the blocking pool.

use std::path::PathBuf;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use chronicle_git::{CommitDetails, Repository};
use chronicle_index::{CommitDoc, CommitIndex, PersonIdent};

use crate::error::{Error, Result};
use crate::reconciler::select_commits;
use crate::registry::{RepoKey, TrackedRepo};

/// Syncs tracked repositories into the commit index.
#[derive(Debug)]
pub struct SyncProcessor<I> {
    index: I,
    work_dir: PathBuf,
    commit_limit: u32,
    schema_ready: OnceCell<()>,
}

impl<I: CommitIndex> SyncProcessor<I> {
    /// Create a processor publishing into `index`, keeping working
    /// copies under `work_dir`.
    pub fn new(index: I, work_dir: impl Into<PathBuf>, commit_limit: u32) -> Self {
        Self {
            index,
            work_dir: work_dir.into(),
            commit_limit,
            schema_ready: OnceCell::new(),
        }
    }

    /// The index handle, mainly for inspection in tests.
    pub const fn index(&self) -> &I {
        &self.index
    }

    /// Where the working copy for `key` lives on disk.
    #[must_use]
    pub fn checkout_path(&self, key: &RepoKey) -> PathBuf {
        self.work_dir.join(&key.namespace).join(&key.name)
    }

    /// Bring one repository's index scope up to date with its branch.
    ///
    /// Returns the number of commits published. A failed publish aborts
    /// the run with the remainder untouched; because commits go out in
    /// boundary-extending order the published range stays contiguous
    /// and the next run picks up exactly where this one stopped.
    ///
    /// # Errors
    /// Returns error when the clone fails, the index is unreachable or
    /// a publish is rejected. The schema check runs at most once per
    /// process; a failure there is retried on the next sync.
    pub async fn sync(&self, repo: &TrackedRepo) -> Result<usize> {
        self.schema_ready
            .get_or_try_init(|| self.index.ensure_schema())
            .await?;

        let path = self.checkout_path(&repo.key);
        let history = {
            let path = path.clone();
            let url = repo.clone_uri.clone();
            let branch = repo.branch.clone();
            tokio::task::spawn_blocking(move || -> chronicle_git::Result<Vec<String>> {
                let checkout = Repository::ensure_up_to_date(&path, &url, &branch)?;
                match checkout.head_history() {
                    Ok(shas) => Ok(shas),
                    Err(chronicle_git::Error::NoHead) => Ok(Vec::new()),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(|e| Error::Task(e.to_string()))??
        };

        if history.is_empty() {
            debug!(repo = %repo.key, "no commits on branch, nothing to publish");
            return Ok(0);
        }

        let key = &repo.key;
        let newest = self
            .index
            .newest_sha(&key.namespace, &key.name, &repo.branch)
            .await?;
        // Without a newest commit the scope is empty and the oldest
        // query cannot return anything either.
        let oldest = match &newest {
            Some(_) => {
                self.index
                    .oldest_sha(&key.namespace, &key.name, &repo.branch)
                    .await?
            }
            None => None,
        };

        let selected = select_commits(
            &history,
            newest.as_deref(),
            oldest.as_deref(),
            self.commit_limit,
        );
        if selected.is_empty() {
            debug!(repo = %repo.key, "index already up to date");
            return Ok(0);
        }

        let details = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || -> chronicle_git::Result<Vec<CommitDetails>> {
                let checkout = Repository::open(&path)?;
                selected
                    .iter()
                    .map(|sha| checkout.commit_details(sha))
                    .collect()
            })
            .await
            .map_err(|e| Error::Task(e.to_string()))??
        };

        let mut published = 0;
        for commit in details {
            let doc = to_doc(repo, commit);
            self.index.publish(&doc).await?;
            published += 1;
        }

        info!(repo = %repo.key, branch = %repo.branch, published, "sync complete");
        Ok(published)
    }
}

fn to_doc(repo: &TrackedRepo, commit: CommitDetails) -> CommitDoc {
    CommitDoc {
        namespace: repo.key.namespace.clone(),
        repo: repo.key.name.clone(),
        branch: repo.branch.clone(),
        repo_url: repo.clone_uri.clone(),
        sha: commit.sha,
        author: to_ident(commit.author),
        committer: to_ident(commit.committer),
        short_message: commit.short_message,
        full_message: commit.full_message,
        commit_time: commit.commit_time,
        lines_added: commit.lines_added as u64,
        lines_removed: commit.lines_removed as u64,
        timestamp: commit.commit_time,
    }
}

fn to_ident(identity: chronicle_git::Identity) -> PersonIdent {
    PersonIdent {
        name: identity.name,
        email: identity.email,
        time_zone: identity.timezone,
        when: identity.when,
    }
}
