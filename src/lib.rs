//! qa-ledger - vote ledger and two-party chat core for a Q&A backend.
//!
//! Users cast up/down votes on questions and answers; every subject carries
//! a materialized tally that always equals the sum of its live vote records.
//! Separately, users exchange messages in conversations that are keyed by
//! the unordered pair of participants.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Pure types and rules: [`domain::vote::decide`] maps a
//!   current vote and a request to a transition with its tally delta;
//!   [`domain::chat::UserPair`] canonicalizes a pair of usernames.
//! - [`port`] - Request shapes accepted by the services and the store traits
//!   they depend on.
//! - [`application`] - `VoteLedger`, `SubjectService`, `ChatResolver` and
//!   `Messenger`, which serialize read-decide-write sequences per key.
//! - [`adapter`] - In-memory and SQLite stores, and the `clap` command line.
//! - [`infrastructure`] - Configuration, logging and store wiring.
//! - [`error`] - Error types for the crate.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use qa_ledger::adapter::outbound::memory::MemoryStore;
//! use qa_ledger::application::{SubjectService, VoteLedger};
//! use qa_ledger::port::inbound::VoteRequest;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let subjects = SubjectService::new(Arc::clone(&store));
//! let ledger = VoteLedger::new(store);
//!
//! let question = subjects.ask("carol", "Lifetimes", "What does 'a mean?").await.unwrap();
//! let outcome = ledger
//!     .apply(VoteRequest::new(question.id.clone(), "alice", 1))
//!     .await
//!     .unwrap();
//! assert_eq!(outcome.tally, 1);
//! # });
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
