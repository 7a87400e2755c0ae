//! Registry of tracked repositories.
//!
//! The registry is the single source of truth for what the scheduler
//! iterates over. Watch events mutate it; sweeps read a point-in-time
//! snapshot so mutators are never blocked for long.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{Error, Result};

/// Unique identity of a tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoKey {
    pub namespace: String,
    pub name: String,
}

impl RepoKey {
    /// Create a key from namespace and name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A repository the engine keeps in sync with the index.
///
/// Replaced wholesale on update events; never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRepo {
    pub key: RepoKey,
    pub clone_uri: String,
    pub branch: String,
}

impl TrackedRepo {
    /// Branch tracked when the descriptor doesn't name one.
    pub const DEFAULT_BRANCH: &'static str = "master";

    /// Build a validated descriptor. Blank identity fields or a blank
    /// clone URI are rejected here so they are never stored.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRepo`] for malformed descriptors.
    pub fn new(
        namespace: &str,
        name: &str,
        clone_uri: &str,
        branch: Option<&str>,
    ) -> Result<Self> {
        if namespace.trim().is_empty() {
            return Err(Error::InvalidRepo("missing namespace".into()));
        }
        if name.trim().is_empty() {
            return Err(Error::InvalidRepo("missing name".into()));
        }
        if clone_uri.trim().is_empty() {
            return Err(Error::InvalidRepo(format!(
                "no clone URI for {namespace}/{name}"
            )));
        }

        let branch = match branch {
            Some(b) if !b.trim().is_empty() => b.to_string(),
            _ => Self::DEFAULT_BRANCH.to_string(),
        };

        Ok(Self {
            key: RepoKey::new(namespace, name),
            clone_uri: clone_uri.to_string(),
            branch,
        })
    }
}

/// Concurrent-safe map of tracked repositories keyed by
/// (namespace, name).
#[derive(Debug, Default)]
pub struct Registry {
    inner: RwLock<BTreeMap<RepoKey, TrackedRepo>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tracked repository. A second add with the
    /// same key overwrites, never duplicates.
    pub fn upsert(&self, repo: TrackedRepo) {
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.insert(repo.key.clone(), repo);
    }

    /// Remove a tracked repository, returning it if present.
    pub fn remove(&self, key: &RepoKey) -> Option<TrackedRepo> {
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.remove(key)
    }

    /// Current descriptor for a key, if tracked.
    #[must_use]
    pub fn get(&self, key: &RepoKey) -> Option<TrackedRepo> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    /// Point-in-time copy of all tracked repositories, ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TrackedRepo> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().cloned().collect()
    }

    /// Number of tracked repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn repo(namespace: &str, name: &str, uri: &str) -> TrackedRepo {
        TrackedRepo::new(namespace, name, uri, None).unwrap()
    }

    #[test]
    fn test_branch_defaults_to_master() {
        let repo = repo("default", "myapp", "https://example.com/myapp.git");
        assert_eq!(repo.branch, "master");

        let repo =
            TrackedRepo::new("default", "myapp", "https://example.com/myapp.git", Some("dev"))
                .unwrap();
        assert_eq!(repo.branch, "dev");
    }

    #[test]
    fn test_malformed_descriptors_rejected() {
        assert!(matches!(
            TrackedRepo::new("", "myapp", "https://example.com/a.git", None),
            Err(Error::InvalidRepo(_))
        ));
        assert!(matches!(
            TrackedRepo::new("default", "  ", "https://example.com/a.git", None),
            Err(Error::InvalidRepo(_))
        ));
        assert!(matches!(
            TrackedRepo::new("default", "myapp", "", None),
            Err(Error::InvalidRepo(_))
        ));
    }

    #[test]
    fn test_upsert_overwrites_same_key() {
        let registry = Registry::new();
        registry.upsert(repo("default", "myapp", "https://example.com/a.git"));
        registry.upsert(repo("default", "myapp", "https://example.com/b.git"));

        assert_eq!(registry.len(), 1);
        let stored = registry.get(&RepoKey::new("default", "myapp")).unwrap();
        assert_eq!(stored.clone_uri, "https://example.com/b.git");
    }

    #[test]
    fn test_snapshot_ordered_by_key() {
        let registry = Registry::new();
        registry.upsert(repo("team-b", "zulu", "https://example.com/z.git"));
        registry.upsert(repo("team-a", "alpha", "https://example.com/a.git"));
        registry.upsert(repo("team-a", "bravo", "https://example.com/b.git"));

        let keys: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|r| r.key.to_string())
            .collect();
        assert_eq!(keys, vec!["team-a/alpha", "team-a/bravo", "team-b/zulu"]);
    }

    #[test]
    fn test_remove() {
        let registry = Registry::new();
        let key = RepoKey::new("default", "myapp");
        registry.upsert(repo("default", "myapp", "https://example.com/a.git"));

        assert!(registry.remove(&key).is_some());
        assert!(registry.get(&key).is_none());
        assert!(registry.is_empty());
        assert!(registry.remove(&key).is_none());
    }
}
