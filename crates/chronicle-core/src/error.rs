//! Error types for chronicle-core.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the sync engine.
///
/// All of these are repository-scoped: the scheduler logs them and
/// moves on, they never abort a sweep or take the process down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed repository descriptor, rejected before it is stored.
    #[error("invalid repository descriptor: {0}")]
    InvalidRepo(String),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] chronicle_git::Error),

    /// Index store error.
    #[error("index error: {0}")]
    Index(#[from] chronicle_index::Error),

    /// A blocking sync task panicked or was cancelled.
    #[error("sync task failed: {0}")]
    Task(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
