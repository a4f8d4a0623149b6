//! Persistence factory: picks and opens the configured store.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::memory::MemoryStore;
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::domain::{
    Conversation, ConversationId, DeletedSubject, Message, Subject, SubjectFilter, SubjectId,
    TallyAudit, UserPair, Username, VoteChange, VoteRecord,
};
use crate::error::{Error, Result};
use crate::infrastructure::config::storage::{StorageBackend, StorageConfig};
use crate::infrastructure::paths;
use crate::port::outbound::store::{ChatStore, SubjectStore, VoteStore};

/// The store selected by configuration.
///
/// The store ports are generic, so backends are chosen through this enum
/// rather than a trait object.
#[derive(Clone)]
pub enum LedgerStore {
    Memory(Arc<MemoryStore>),
    Sqlite(Arc<SqliteStore>),
}

impl LedgerStore {
    #[must_use]
    pub const fn backend(&self) -> StorageBackend {
        match self {
            Self::Memory(_) => StorageBackend::Memory,
            Self::Sqlite(_) => StorageBackend::Sqlite,
        }
    }
}

/// Open the store described by `config`, running migrations for SQLite.
///
/// # Errors
/// Returns an error if the database directory cannot be created or the
/// database cannot be opened.
pub fn build_store(config: &StorageConfig) -> Result<LedgerStore> {
    match config.backend {
        StorageBackend::Memory => {
            info!(backend = %config.backend, "Store ready");
            Ok(LedgerStore::Memory(Arc::new(MemoryStore::new())))
        }
        StorageBackend::Sqlite => {
            let path = config.database_path();
            paths::ensure_parent(&path)?;
            let url = path
                .to_str()
                .ok_or_else(|| Error::Connection(format!("non UTF-8 path {}", path.display())))?;
            let store = SqliteStore::open(url, config.pool_options())?;
            info!(backend = %config.backend, database = %path.display(), "Store ready");
            Ok(LedgerStore::Sqlite(Arc::new(store)))
        }
    }
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            LedgerStore::Memory($store) => $call.await,
            LedgerStore::Sqlite($store) => $call.await,
        }
    };
}

impl SubjectStore for LedgerStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<()> {
        delegate!(self, s => s.insert_subject(subject))
    }

    async fn get_subject(&self, id: &SubjectId) -> Result<Option<Subject>> {
        delegate!(self, s => s.get_subject(id))
    }

    async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>> {
        delegate!(self, s => s.list_subjects(filter))
    }

    async fn list_answers(&self, question: &SubjectId) -> Result<Vec<Subject>> {
        delegate!(self, s => s.list_answers(question))
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool> {
        delegate!(self, s => s.update_subject(subject))
    }

    async fn delete_subject(&self, id: &SubjectId) -> Result<Option<DeletedSubject>> {
        delegate!(self, s => s.delete_subject(id))
    }
}

impl VoteStore for LedgerStore {
    async fn find_vote(&self, subject: &SubjectId, voter: &Username) -> Result<Option<VoteRecord>> {
        delegate!(self, s => s.find_vote(subject, voter))
    }

    async fn list_votes(&self, subject: &SubjectId) -> Result<Vec<VoteRecord>> {
        delegate!(self, s => s.list_votes(subject))
    }

    async fn commit_vote(&self, change: &VoteChange) -> Result<i64> {
        delegate!(self, s => s.commit_vote(change))
    }

    async fn audit_tally(&self, subject: &SubjectId) -> Result<Option<TallyAudit>> {
        delegate!(self, s => s.audit_tally(subject))
    }
}

impl ChatStore for LedgerStore {
    async fn find_conversation(&self, pair: &UserPair) -> Result<Option<Conversation>> {
        delegate!(self, s => s.find_conversation(pair))
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        delegate!(self, s => s.get_conversation(id))
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        delegate!(self, s => s.insert_conversation(conversation))
    }

    async fn list_conversations(&self, user: &Username) -> Result<Vec<Conversation>> {
        delegate!(self, s => s.list_conversations(user))
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<Option<usize>> {
        delegate!(self, s => s.delete_conversation(id))
    }

    async fn append_message(&self, message: &Message) -> Result<()> {
        delegate!(self, s => s.append_message(message))
    }

    async fn list_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        delegate!(self, s => s.list_messages(conversation))
    }
}
