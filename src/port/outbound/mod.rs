//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the entity store the core depends on. They
//! promise per-call atomicity; any multi-row unit the core needs (a vote
//! record plus its tally, a subject plus its votes) is a single call.

pub mod store;
