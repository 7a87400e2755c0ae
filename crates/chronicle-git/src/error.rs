//! Error types for chronicle-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cloning a remote repository failed. Fatal for the current sync
    /// attempt; a later sweep retries.
    #[error("failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// Updating an existing working copy failed. Callers treat this as
    /// non-fatal and keep indexing from the stale local state.
    #[error("pull failed: {0}")]
    PullFailed(String),

    /// HEAD cannot be resolved, e.g. an empty repository.
    #[error("cannot resolve HEAD - repository has no commits")]
    NoHead,

    /// Commit not found in the local repository.
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
