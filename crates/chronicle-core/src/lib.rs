//! # chronicle-core
//!
//! The commit-sync engine: a registry of tracked repositories driven by
//! watch events, a scheduler that polls them without unbounded resource
//! growth, and the reconciliation algorithm that decides which commits
//! still need publishing to the search index.

pub mod config;
pub mod error;
pub mod processor;
pub mod reconciler;
pub mod registry;
pub mod scheduler;
pub mod watch;

pub use config::{Config, IndexConfig};
pub use error::{Error, Result};
pub use processor::SyncProcessor;
pub use registry::{Registry, RepoKey, TrackedRepo};
pub use scheduler::Scheduler;
pub use watch::WatchEvent;
