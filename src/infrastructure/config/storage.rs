//! Storage backend configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::outbound::sqlite::PoolOptions;
use crate::infrastructure::paths;

/// Which store implementation backs the services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable SQLite database.
    #[default]
    Sqlite,
    /// Process-local maps; everything is lost on exit.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file. A leading `~/` is expanded to the home directory.
    pub database: String,
    /// Maximum pooled SQLite connections.
    pub pool_size: u32,
    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database: paths::default_database().to_string_lossy().into_owned(),
            pool_size: 5,
            busy_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    /// The database location with `~/` expanded.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        paths::expand_home(&self.database)
    }

    /// Pool settings for the SQLite adapter.
    #[must_use]
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.pool_size,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}
