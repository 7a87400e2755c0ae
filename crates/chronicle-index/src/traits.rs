//! Trait abstraction for the commit index.
//!
//! This module defines the `CommitIndex` trait which abstracts the
//! index store operations the sync engine depends on, enabling
//! dependency injection and mock implementations for testing.

use crate::error::Result;
use crate::types::CommitDoc;

/// Operations the sync engine needs from the commit index.
///
/// Implemented by [`crate::CommitStore`] for the real HTTP store and by
/// in-memory mocks in chronicle-core's tests.
pub trait CommitIndex: Send + Sync {
    /// Idempotently ensure the index and its mappings exist.
    fn ensure_schema(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// SHA of the newest indexed commit for `(namespace, repo, branch)`,
    /// or `None` when the scope has no documents yet.
    fn newest_sha(
        &self,
        namespace: &str,
        repo: &str,
        branch: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// SHA of the oldest indexed commit for `(namespace, repo, branch)`,
    /// or `None` when the scope has no documents yet.
    fn oldest_sha(
        &self,
        namespace: &str,
        repo: &str,
        branch: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Upsert one commit document at its SHA-derived address.
    fn publish(&self, doc: &CommitDoc) -> impl std::future::Future<Output = Result<()>> + Send;
}
