//! Storage-agnostic domain types and rules.
//!
//! Nothing in here performs I/O. The vote transition rules live in
//! [`vote::decide`]; pair canonicalization lives in [`chat::UserPair`].

pub mod chat;
pub mod error;
pub mod id;
pub mod subject;
pub mod user;
pub mod vote;

pub use chat::{Conversation, Message, UserPair};
pub use error::DomainError;
pub use id::{ConversationId, MessageId, SubjectId, VoteId};
pub use subject::{
    DeletedSubject, QuestionStatus, Subject, SubjectEdit, SubjectFilter, SubjectKind, TallyAudit,
};
pub use user::Username;
pub use vote::{Decision, RecordAction, RequestedVote, Transition, Vote, VoteChange, VoteRecord};
