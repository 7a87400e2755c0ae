//! Repository wrapper providing the sync engine's git operations.

use std::fs;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Oid, Sort};
use tracing::{debug, info, warn};

use crate::commit::{CommitDetails, Identity, timestamp};
use crate::error::{Error, Result};

/// Name of the single remote a working copy tracks.
pub const DEFAULT_REMOTE: &str = "origin";

/// High-level wrapper around a local git working copy.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open an existing repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository exists at the path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::open(path)?;
        Ok(Self { inner })
    }

    /// Clone a remote repository into `path`, checking out `branch`.
    ///
    /// # Errors
    /// Returns [`Error::CloneFailed`] if the clone cannot complete.
    pub fn clone_remote(url: &str, path: &Path, branch: &str) -> Result<Self> {
        info!(url, path = %path.display(), "cloning git repository");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::CloneFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        }

        let inner = RepoBuilder::new()
            .branch(branch)
            .clone(url, path)
            .map_err(|e| Error::CloneFailed {
                url: url.to_string(),
                message: e.message().to_string(),
            })?;

        Ok(Self { inner })
    }

    /// Materialize an up-to-date working copy of `url` at `path`.
    ///
    /// Clones when no working copy exists yet. Otherwise opens the
    /// existing copy and pulls `branch`; a failed pull is logged and
    /// swallowed so a transient network error does not block indexing
    /// of the already-cloned history.
    ///
    /// # Errors
    /// Returns error if the clone fails or an existing copy cannot be
    /// opened.
    pub fn ensure_up_to_date(path: &Path, url: &str, branch: &str) -> Result<Self> {
        if !path.join(".git").is_dir() {
            return Self::clone_remote(url, path, branch);
        }

        let repo = Self::open(path)?;
        if let Err(e) = repo.pull(branch) {
            warn!(url, branch, error = %e, "pull failed, using existing local state");
        }
        Ok(repo)
    }

    /// Fetch `branch` from origin and fast-forward the local branch to
    /// the fetched tip.
    ///
    /// The working copy is never committed to locally, so a pull with
    /// rebase semantics degenerates to a fast-forward.
    ///
    /// # Errors
    /// Returns error if the fetch fails or the local branch has
    /// diverged from the remote.
    pub fn pull(&self, branch: &str) -> Result<()> {
        let mut remote = self.inner.find_remote(DEFAULT_REMOTE)?;
        remote.fetch(&[branch], None, None)?;

        let fetch_head = self.inner.find_reference("FETCH_HEAD")?;
        let fetched = self.inner.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = self.inner.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            debug!(branch, "already up to date");
            return Ok(());
        }
        if !analysis.is_fast_forward() {
            return Err(Error::PullFailed(format!(
                "local branch '{branch}' has diverged from {DEFAULT_REMOTE}"
            )));
        }

        let refname = format!("refs/heads/{branch}");
        match self.inner.find_reference(&refname) {
            Ok(mut reference) => {
                reference.set_target(fetched.id(), "chronicle: fast-forward")?;
            }
            Err(_) => {
                self.inner
                    .reference(&refname, fetched.id(), true, "chronicle: set branch")?;
            }
        }
        self.inner.set_head(&refname)?;
        self.inner
            .checkout_head(Some(CheckoutBuilder::default().force()))?;

        debug!(branch, tip = %fetched.id(), "fast-forwarded");
        Ok(())
    }

    /// Walk all commits reachable from HEAD, newest first.
    ///
    /// # Errors
    /// Returns [`Error::NoHead`] for an empty repository.
    pub fn head_history(&self) -> Result<Vec<String>> {
        let head = self.inner.head().map_err(|_| Error::NoHead)?;
        let target = head.target().ok_or(Error::NoHead)?;

        let mut revwalk = self.inner.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(target)?;

        let mut shas = Vec::new();
        for oid in revwalk {
            shas.push(oid?.to_string());
        }
        Ok(shas)
    }

    /// Load full metadata for one commit, including diff statistics
    /// against its first parent. A root commit diffs against its own
    /// tree, which yields zero added/removed lines.
    ///
    /// # Errors
    /// Returns error if the commit cannot be found or the diff fails.
    pub fn commit_details(&self, sha: &str) -> Result<CommitDetails> {
        let oid = Oid::from_str(sha).map_err(|_| Error::CommitNotFound(sha.to_string()))?;
        let commit = self
            .inner
            .find_commit(oid)
            .map_err(|_| Error::CommitNotFound(sha.to_string()))?;

        let (lines_added, lines_removed) = self.diff_stats(&commit)?;

        Ok(CommitDetails {
            sha: sha.to_string(),
            author: Identity::from_signature(&commit.author()),
            committer: Identity::from_signature(&commit.committer()),
            short_message: commit.summary().unwrap_or_default().to_string(),
            full_message: commit.message().unwrap_or_default().to_string(),
            commit_time: timestamp(commit.time().seconds()),
            lines_added,
            lines_removed,
        })
    }

    fn diff_stats(&self, commit: &git2::Commit<'_>) -> Result<(usize, usize)> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => parent.tree()?,
            Err(_) => tree.clone(),
        };

        let diff = self
            .inner
            .diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;
        let stats = diff.stats()?;
        Ok((stats.insertions(), stats.deletions()))
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.inner.path())
            .finish()
    }
}
