//! Inbound (driving) ports consumed by inbound adapters.
//!
//! Raw request shapes as they arrive from an external controller or the
//! command line. Application services validate them before touching any
//! store.

pub mod request;

pub use request::{ChatTarget, NewQuestion, SendMessage, VoteRequest};
