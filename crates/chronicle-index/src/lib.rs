//! # chronicle-index
//!
//! Search-index integration for Chronicle. Talks to a generic
//! Elasticsearch-style document store over HTTP: search, index and
//! mapping management, and idempotent commit-document upserts keyed by
//! commit SHA.
//!
//! # Security
//!
//! Basic-auth passwords are stored using `SecretString` which
//! automatically zeroizes memory when dropped.

mod client;
mod error;
mod search;
mod store;
mod traits;
mod types;

pub use client::IndexClient;
pub use error::{Error, Result};
// Re-export SecretString for constructing credentials
pub use secrecy::SecretString;
pub use search::{SearchQuery, SearchResults, SortOrder};
pub use store::CommitStore;
pub use traits::CommitIndex;
pub use types::{CommitDoc, PersonIdent};
