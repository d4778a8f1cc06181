//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5001").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:5001".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Registry storage configuration.
///
/// Only the root directory is read here; the index database lives next to the
/// registry's own data under that root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the registry storage driver.
    #[serde(default = "default_root_directory")]
    pub rootdirectory: PathBuf,
}

fn default_root_directory() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            rootdirectory: default_root_directory(),
        }
    }
}

/// Index database configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Database file name, joined onto the storage root directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_file_name() -> String {
    crate::DEFAULT_DATABASE_FILE.to_string()
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl IndexConfig {
    /// Full path of the index database for the given storage root.
    pub fn database_path(&self, storage: &StorageConfig) -> PathBuf {
        storage.rootdirectory.join(&self.file_name)
    }

    /// Busy timeout as a Duration.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Registry storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Index database configuration.
    #[serde(default)]
    pub index: IndexConfig,
}

impl AppConfig {
    /// Create a test configuration rooted at the given directory.
    ///
    /// **For testing only.** Metrics are disabled so routers built from this
    /// config do not touch the global registry.
    pub fn for_testing(root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                metrics_enabled: false,
                ..Default::default()
            },
            storage: StorageConfig {
                rootdirectory: root.into(),
            },
            index: IndexConfig::default(),
        }
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> crate::Result<()> {
        if self.index.file_name.trim().is_empty() {
            return Err(crate::Error::Config(
                "index.file_name must not be empty".to_string(),
            ));
        }
        if self.index.file_name.contains(['/', '\\']) {
            return Err(crate::Error::Config(format!(
                "index.file_name must be a bare file name, got '{}'",
                self.index.file_name
            )));
        }
        if self.storage.rootdirectory.as_os_str().is_empty() {
            return Err(crate::Error::Config(
                "storage.rootdirectory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
