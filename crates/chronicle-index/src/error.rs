//! Error types for chronicle-index.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the search index.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credentials were rejected by the index store.
    #[error("index authentication failed - check username/password")]
    AuthenticationFailed,

    /// Non-success response from the index API.
    #[error("index API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse index response: {0}")]
    Parse(#[from] serde_json::Error),
}
