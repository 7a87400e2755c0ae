//! Configuration for the Chronicle collector.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Collector configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the local working copies, one per
    /// namespace/name pair.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Delay between two full sweeps over the registry, in milliseconds.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Maximum commits published per repository per sync attempt;
    /// 0 means unlimited. Large backlogs drain across sweeps.
    #[serde(default = "default_commit_limit")]
    pub commit_limit: u32,

    /// Index store settings.
    #[serde(default)]
    pub index: IndexConfig,
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when the
    /// file doesn't exist.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Sweep interval as a [`Duration`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            sweep_interval_ms: default_sweep_interval_ms(),
            commit_limit: default_commit_limit(),
            index: IndexConfig::default(),
        }
    }
}

/// Index store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the index store.
    #[serde(default = "default_index_url")]
    pub url: String,

    /// Optional basic-auth username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Optional basic-auth password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Index name commits are published into.
    #[serde(default = "default_index_name")]
    pub index: String,

    /// Document type within the index.
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            username: None,
            password: None,
            index: default_index_name(),
            doc_type: default_doc_type(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    "chronicle-work".into()
}

const fn default_sweep_interval_ms() -> u64 {
    60_000
}

const fn default_commit_limit() -> u32 {
    100
}

fn default_index_url() -> String {
    "http://elasticsearch:9200".into()
}

fn default_index_name() -> String {
    "git".into()
}

fn default_doc_type() -> String {
    "commit".into()
}
