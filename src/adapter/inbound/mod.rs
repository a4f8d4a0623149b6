//! Inbound adapters that drive the application services.

pub mod cli;
