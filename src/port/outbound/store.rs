//! Persistence ports for subjects, vote records and conversations.

use std::future::Future;

use crate::domain::{
    Conversation, ConversationId, DeletedSubject, Message, Subject, SubjectFilter, SubjectId,
    TallyAudit, UserPair, Username, VoteChange, VoteRecord,
};
use crate::error::Result;

/// Storage operations for vote subjects (tally holders).
pub trait SubjectStore: Send + Sync {
    /// Insert a new subject. Answers must reference an existing question.
    fn insert_subject(&self, subject: &Subject) -> impl Future<Output = Result<()>> + Send;

    /// Get a subject by ID, including its current tally.
    fn get_subject(&self, id: &SubjectId) -> impl Future<Output = Result<Option<Subject>>> + Send;

    /// List subjects matching `filter` in creation order.
    fn list_subjects(
        &self,
        filter: &SubjectFilter,
    ) -> impl Future<Output = Result<Vec<Subject>>> + Send;

    /// Overwrite the editable and moderation fields of a stored subject.
    ///
    /// Identity, kind, parent, author, creation time and `vote_tally` are
    /// never written. Returns `false` if the subject does not exist.
    fn update_subject(&self, subject: &Subject) -> impl Future<Output = Result<bool>> + Send;

    /// List the answers of a question in creation order.
    fn list_answers(
        &self,
        question: &SubjectId,
    ) -> impl Future<Output = Result<Vec<Subject>>> + Send;

    /// Delete a subject together with its vote records in one unit.
    ///
    /// Deleting a question also deletes its answers and their votes.
    /// Returns `None` if the subject does not exist.
    fn delete_subject(
        &self,
        id: &SubjectId,
    ) -> impl Future<Output = Result<Option<DeletedSubject>>> + Send;
}

/// Storage operations for per-voter vote records.
///
/// Lookup by `(subject, voter)` is unique: implementations enforce it at the
/// storage level, not only in queries.
pub trait VoteStore: Send + Sync {
    /// Find the live vote of `voter` on `subject`.
    fn find_vote(
        &self,
        subject: &SubjectId,
        voter: &Username,
    ) -> impl Future<Output = Result<Option<VoteRecord>>> + Send;

    /// List all live votes on a subject.
    fn list_votes(
        &self,
        subject: &SubjectId,
    ) -> impl Future<Output = Result<Vec<VoteRecord>>> + Send;

    /// Apply a record change and its tally delta atomically.
    ///
    /// The delta is added to the stored tally. Returns the tally after the
    /// change. Fails with `NotFound` if the subject is gone, with
    /// `Conflict(DuplicateVote)` if an insert collides with an existing
    /// record, and with `Conflict(StaleVote)` if an update or delete finds
    /// the record no longer holding its expected vote. Nothing is written
    /// on failure.
    ///
    /// Vote records are removed otherwise only together with their subject
    /// (see [`SubjectStore::delete_subject`]).
    fn commit_vote(&self, change: &VoteChange) -> impl Future<Output = Result<i64>> + Send;

    /// Read a subject's stored tally and its live votes from one snapshot.
    ///
    /// Returns `None` if the subject does not exist.
    fn audit_tally(
        &self,
        subject: &SubjectId,
    ) -> impl Future<Output = Result<Option<TallyAudit>>> + Send;
}

/// Storage operations for conversations and their messages.
///
/// At most one conversation exists per canonical [`UserPair`];
/// implementations enforce it at the storage level.
pub trait ChatStore: Send + Sync {
    /// Find the conversation for an unordered pair.
    fn find_conversation(
        &self,
        pair: &UserPair,
    ) -> impl Future<Output = Result<Option<Conversation>>> + Send;

    /// Get a conversation by ID.
    fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> impl Future<Output = Result<Option<Conversation>>> + Send;

    /// Insert a new conversation.
    ///
    /// Fails with `Conflict(DuplicateConversation)` if one already exists
    /// for the same pair; nothing is written in that case.
    fn insert_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List every conversation `user` is a party to.
    fn list_conversations(
        &self,
        user: &Username,
    ) -> impl Future<Output = Result<Vec<Conversation>>> + Send;

    /// Delete a conversation and all of its messages.
    ///
    /// Returns the number of messages removed, or `None` if the
    /// conversation does not exist.
    fn delete_conversation(
        &self,
        id: &ConversationId,
    ) -> impl Future<Output = Result<Option<usize>>> + Send;

    /// Append a message. Fails with `NotFound` if the conversation is gone.
    fn append_message(&self, message: &Message) -> impl Future<Output = Result<()>> + Send;

    /// List the messages of a conversation in insertion order.
    fn list_messages(
        &self,
        conversation: &ConversationId,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;
}
