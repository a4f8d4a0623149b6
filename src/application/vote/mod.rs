//! Vote ledger use cases.

mod ledger;

pub use ledger::{VoteLedger, VoteOutcome};
