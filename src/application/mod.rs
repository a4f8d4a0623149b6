//! Application services (use cases).
//!
//! These services orchestrate domain logic over the outbound store ports.
//! They hold no process-wide state beyond the keyed locks that serialize
//! read-decide-write sequences per key.

pub mod chat;
pub mod lock;
pub mod subject;
pub mod vote;

pub use chat::{ChatResolver, Delivered, Messenger};
pub use lock::KeyedLocks;
pub use subject::SubjectService;
pub use vote::{VoteLedger, VoteOutcome};
