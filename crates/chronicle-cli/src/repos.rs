//! Tracked-repositories file.
//!
//! A TOML file of `[[repository]]` entries seeds the registry at
//! startup, standing in for a live watch stream:
//!
//! ```toml
//! [[repository]]
//! namespace = "default"
//! name = "myapp"
//! clone_uri = "https://example.com/myapp.git"
//! branch = "main"        # optional, defaults to master
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use chronicle_core::TrackedRepo;

#[derive(Debug, Deserialize)]
struct ReposFile {
    #[serde(default, rename = "repository")]
    repositories: Vec<RepoEntry>,
}

#[derive(Debug, Deserialize)]
struct RepoEntry {
    namespace: String,
    name: String,
    clone_uri: String,
    branch: Option<String>,
}

/// Load and validate the tracked repositories. A missing file is not
/// an error; it just means nothing is tracked yet. Malformed entries
/// are logged and dropped so one bad stanza cannot take the rest of
/// the fleet offline.
pub fn load(path: &Path) -> anyhow::Result<Vec<TrackedRepo>> {
    if !path.exists() {
        warn!(path = %path.display(), "repos file not found, tracking nothing");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: ReposFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut repos = Vec::with_capacity(file.repositories.len());
    for entry in file.repositories {
        match TrackedRepo::new(
            &entry.namespace,
            &entry.name,
            &entry.clone_uri,
            entry.branch.as_deref(),
        ) {
            Ok(repo) => repos.push(repo),
            Err(e) => {
                warn!(namespace = %entry.namespace, name = %entry.name, error = %e,
                    "skipping malformed repository entry");
            }
        }
    }
    Ok(repos)
}
