//! # chronicle-git
//!
//! Git operations abstraction layer for Chronicle, built on git2-rs.
//! Provides the primitives the sync engine needs: materializing a local
//! working copy (clone-if-absent, pull-if-present), walking branch
//! history and computing per-commit diff statistics.

mod commit;
mod error;
mod repository;

pub use commit::{CommitDetails, Identity};
pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::Repository;
