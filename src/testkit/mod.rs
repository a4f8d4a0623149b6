//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`]: Builders for usernames, subjects and user pairs.
//! - [`votes`]: Seeded random vote scripts and their expected tallies.

pub mod domain;
pub mod votes;
