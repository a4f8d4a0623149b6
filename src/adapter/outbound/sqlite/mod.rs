//! SQLite persistence adapter.
//!
//! Implements the subject, vote and chat store ports on top of Diesel with
//! an r2d2 connection pool and embedded migrations.

pub mod database;
pub mod store;

pub use database::connection::PoolOptions;
pub use store::SqliteStore;
