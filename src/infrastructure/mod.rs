//! Infrastructure: configuration, paths and runtime wiring.

pub mod bootstrap;
pub mod config;
pub mod factory;
pub mod paths;

pub use bootstrap::{build_services, Services};
