//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `try_new`/`parse` constructors before any
//! store is touched, so a rejected request never leaves partial state.
//!
//! # Examples
//!
//! ```
//! use qa_ledger::domain::error::DomainError;
//! use qa_ledger::domain::vote::RequestedVote;
//!
//! let result = RequestedVote::parse(2);
//! assert!(matches!(result, Err(DomainError::VoteOutOfRange { value: 2 })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
///
/// Every variant maps to the invalid-input category: the request itself is
/// malformed and retrying it unchanged will fail again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A username (voter, author, chat party) was empty or blank.
    #[error("{field} cannot be empty")]
    EmptyUsername {
        /// Which request field carried the empty name.
        field: &'static str,
    },

    /// Requested vote value outside of {-1, 0, 1}.
    #[error("vote must be -1, 0 or 1, got {value}")]
    VoteOutOfRange {
        /// The rejected value.
        value: i64,
    },

    /// Message text was empty.
    #[error("message text cannot be empty")]
    EmptyMessage,

    /// Subject body was empty.
    #[error("body cannot be empty")]
    EmptyBody,

    /// A conversation needs two distinct parties.
    #[error("cannot open a conversation between '{user}' and themselves")]
    SelfConversation {
        /// The user named on both sides.
        user: String,
    },

    /// An operation was aimed at the wrong kind of subject.
    #[error("cannot {operation} a {kind}")]
    WrongSubjectKind {
        /// What was attempted.
        operation: &'static str,
        /// Kind of the targeted subject.
        kind: &'static str,
    },

    /// An edit carried no fields to change.
    #[error("edit must change at least one field")]
    EmptyEdit,

    /// The sender of a message is not a party to the conversation.
    #[error("'{user}' is not a party to this conversation")]
    NotAParty {
        /// The offending sender.
        user: String,
    },
}
