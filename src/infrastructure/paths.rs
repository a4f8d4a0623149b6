//! Path utilities for qa-ledger.
//!
//! All data lives under `~/.qa-ledger/`:
//! - `~/.qa-ledger/config.toml` - main configuration
//! - `~/.qa-ledger/qa-ledger.db` - ledger database

use std::path::{Path, PathBuf};

/// Returns the qa-ledger home directory (`~/.qa-ledger/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".qa-ledger")
}

/// Returns the default config file path (`~/.qa-ledger/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default database path (`~/.qa-ledger/qa-ledger.db`).
pub fn default_database() -> PathBuf {
    home_dir().join("qa-ledger.db")
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(raw),
    }
}

/// Ensures the parent directory of `path` exists.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
