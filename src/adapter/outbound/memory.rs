//! In-memory store implementation.
//!
//! All tables live behind a single lock so every trait call is one atomic
//! unit, matching the transactional guarantees of the SQLite adapter.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{
    Conversation, ConversationId, DeletedSubject, Message, RecordAction, Subject, SubjectFilter,
    SubjectId, SubjectKind, TallyAudit, UserPair, Username, VoteChange, VoteRecord,
};
use crate::error::{ConflictError, Error, Result};
use crate::port::outbound::store::{ChatStore, SubjectStore, VoteStore};

#[derive(Debug, Default)]
struct Tables {
    next_seq: u64,
    subjects: HashMap<SubjectId, (u64, Subject)>,
    votes: HashMap<(SubjectId, Username), VoteRecord>,
    conversations: HashMap<ConversationId, Conversation>,
    pairs: HashMap<UserPair, ConversationId>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

impl Tables {
    fn sorted_subjects<'a>(&'a self, filter: impl Fn(&Subject) -> bool) -> Vec<Subject> {
        let mut rows: Vec<&'a (u64, Subject)> =
            self.subjects.values().filter(|(_, s)| filter(s)).collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, s)| s.clone()).collect()
    }

    fn remove_votes_of(&mut self, subject: &SubjectId) -> usize {
        let before = self.votes.len();
        self.votes.retain(|(s, _), _| s != subject);
        before - self.votes.len()
    }
}

/// In-memory store for tests and the `memory` backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubjectStore for MemoryStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<()> {
        let mut tables = self.tables.write();
        if let Some(question) = &subject.question {
            match tables.subjects.get(question) {
                Some((_, parent)) if parent.kind == SubjectKind::Question => {}
                _ => return Err(Error::not_found("question", question)),
            }
        }
        tables.next_seq += 1;
        let seq = tables.next_seq;
        tables
            .subjects
            .insert(subject.id.clone(), (seq, subject.clone()));
        Ok(())
    }

    async fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>> {
        Ok(self.tables.read().subjects.get(id).map(|(_, s)| s.clone()))
    }

    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>> {
        let tables = self.tables.read();
        Ok(tables.sorted_subjects(|s| filter.matches(s)))
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool> {
        let mut tables = self.tables.write();
        let Some((_, stored)) = tables.subjects.get_mut(&subject.id) else {
            return Ok(false);
        };
        stored.title.clone_from(&subject.title);
        stored.body.clone_from(&subject.body);
        stored.topic.clone_from(&subject.topic);
        stored.status = subject.status;
        stored.approved = subject.approved;
        stored.approved_by.clone_from(&subject.approved_by);
        stored.edited_at = subject.edited_at;
        Ok(true)
    }

    async fn list_answers(&self, question: &SubjectId) -> Result<Vec<Subject>> {
        let tables = self.tables.read();
        Ok(tables.sorted_subjects(|s| s.question.as_ref() == Some(question)))
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<Option<DeletedSubject>> {
        let mut tables = self.tables.write();
        let Some((_, subject)) = tables.subjects.remove(id) else {
            return Ok(None);
        };

        let mut deleted = DeletedSubject {
            subjects: 1,
            votes: tables.remove_votes_of(id),
        };

        if subject.kind == SubjectKind::Question {
            let answers: Vec<SubjectId> = tables
                .subjects
                .values()
                .filter(|(_, s)| s.question.as_ref() == Some(id))
                .map(|(_, s)| s.id.clone())
                .collect();
            for answer in answers {
                tables.subjects.remove(&answer);
                deleted.subjects += 1;
                deleted.votes += tables.remove_votes_of(&answer);
            }
        }

        Ok(Some(deleted))
    }
}

impl VoteStore for MemoryStore {
    async fn find_vote(&self, subject: &SubjectId, voter: &Username) -> Result<Option<VoteRecord>> {
        Ok(self
            .tables
            .read()
            .votes
            .get(&(subject.clone(), voter.clone()))
            .cloned())
    }

    async fn list_votes(&self, subject: &SubjectId) -> Result<Vec<VoteRecord>> {
        let tables = self.tables.read();
        let mut votes: Vec<VoteRecord> = tables
            .votes
            .values()
            .filter(|r| &r.subject == subject)
            .cloned()
            .collect();
        votes.sort_by(|a, b| a.voted_at.cmp(&b.voted_at));
        Ok(votes)
    }

    async fn commit_vote(&self, change: &VoteChange) -> Result<i64> {
        let mut tables = self.tables.write();
        if !tables.subjects.contains_key(&change.subject) {
            return Err(Error::not_found("subject", &change.subject));
        }

        // Validate before mutating so a failure leaves both tables untouched.
        match &change.action {
            RecordAction::Insert(record) => {
                let key = (record.subject.clone(), record.voter.clone());
                if tables.votes.contains_key(&key) {
                    return Err(ConflictError::DuplicateVote {
                        subject: record.subject.to_string(),
                        voter: record.voter.to_string(),
                    }
                    .into());
                }
                tables.votes.insert(key, record.clone());
            }
            RecordAction::Update {
                id,
                expected,
                vote,
                voted_at,
            } => {
                let record = tables
                    .votes
                    .values_mut()
                    .find(|r| &r.id == id && r.subject == change.subject && r.vote == *expected)
                    .ok_or_else(|| Error::stale_vote(&change.subject, id))?;
                record.vote = *vote;
                record.voted_at = *voted_at;
            }
            RecordAction::Delete { id, expected } => {
                let key = tables
                    .votes
                    .iter()
                    .find(|(_, r)| &r.id == id && r.subject == change.subject && r.vote == *expected)
                    .map(|(k, _)| k.clone())
                    .ok_or_else(|| Error::stale_vote(&change.subject, id))?;
                tables.votes.remove(&key);
            }
        }

        let (_, subject) = tables
            .subjects
            .get_mut(&change.subject)
            .ok_or_else(|| Error::not_found("subject", &change.subject))?;
        subject.vote_tally += change.delta;
        Ok(subject.vote_tally)
    }

    async fn audit_tally(&self, subject: &SubjectId) -> Result<Option<TallyAudit>> {
        let tables = self.tables.read();
        Ok(tables.subjects.get(subject).map(|(_, stored)| {
            TallyAudit::from_votes(
                stored.vote_tally,
                tables
                    .votes
                    .values()
                    .filter(|r| &r.subject == subject)
                    .map(|r| r.vote.value()),
            )
        }))
    }
}

impl ChatStore for MemoryStore {
    async fn find_conversation(&self, pair: &UserPair) -> Result<Option<Conversation>> {
        let tables = self.tables.read();
        Ok(tables
            .pairs
            .get(pair)
            .and_then(|id| tables.conversations.get(id))
            .cloned())
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        Ok(self.tables.read().conversations.get(id).cloned())
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        let pair = conversation.pair();
        let mut tables = self.tables.write();
        if tables.pairs.contains_key(&pair) {
            return Err(ConflictError::DuplicateConversation {
                low: pair.low().to_string(),
                high: pair.high().to_string(),
            }
            .into());
        }
        tables.pairs.insert(pair, conversation.id.clone());
        tables
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        tables.messages.insert(conversation.id.clone(), Vec::new());
        Ok(())
    }

    async fn list_conversations(&self, user: &Username) -> Result<Vec<Conversation>> {
        let tables = self.tables.read();
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .values()
            .filter(|c| c.involves(user))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(conversations)
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<Option<usize>> {
        let mut tables = self.tables.write();
        let Some(conversation) = tables.conversations.remove(id) else {
            return Ok(None);
        };
        tables.pairs.remove(&conversation.pair());
        let removed = tables.messages.remove(id).map_or(0, |m| m.len());
        Ok(Some(removed))
    }

    async fn append_message(&self, message: &Message) -> Result<()> {
        let mut tables = self.tables.write();
        let messages = tables
            .messages
            .get_mut(&message.conversation)
            .ok_or_else(|| Error::not_found("conversation", &message.conversation))?;
        messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        Ok(self
            .tables
            .read()
            .messages
            .get(conversation)
            .cloned()
            .unwrap_or_default())
    }
}
