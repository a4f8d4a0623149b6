//! Factory modules for building infrastructure components.
//!
//! - [`persistence`] - Store selection and construction

pub mod persistence;

pub use persistence::{build_store, LedgerStore};
