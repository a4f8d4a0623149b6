use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use qa_ledger::adapter::outbound::sqlite::{PoolOptions, SqliteStore};
use qa_ledger::infrastructure::factory::LedgerStore;
use qa_ledger::infrastructure::Services;
use tempfile::TempDir;

/// Temporary SQLite database for integration tests.
///
/// The directory (and the WAL side files) is removed on drop.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    store: Arc<SqliteStore>,
}

impl TempDb {
    pub fn create() -> Self {
        Self::with_pool_size(4)
    }

    pub fn with_pool_size(max_size: u32) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("ledger.db");
        let store = SqliteStore::open(
            path.to_str().expect("utf-8 temp path"),
            PoolOptions {
                max_size,
                busy_timeout: Duration::from_secs(10),
            },
        )
        .expect("open sqlite store");

        Self {
            _dir: dir,
            path,
            store: Arc::new(store),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        Arc::clone(&self.store)
    }

    pub fn services(&self) -> Services {
        Services::new(LedgerStore::Sqlite(self.store()))
    }

    /// A second store over the same file, as another process would see it.
    pub fn reopen(&self) -> SqliteStore {
        SqliteStore::open(
            self.path.to_str().expect("utf-8 temp path"),
            PoolOptions::default(),
        )
        .expect("reopen sqlite store")
    }
}
