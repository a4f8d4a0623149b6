//! Find-or-create for two-party conversations.
//!
//! `(a, b)` and `(b, a)` resolve to the same conversation. Creation is
//! arbitrated twice: a keyed lock on the canonical pair serializes callers
//! in this process, and the store's unique constraint on the pair catches
//! anyone else. A caller that loses at the store drops its own record and
//! returns the winner's.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::lock::KeyedLocks;
use crate::domain::{Conversation, ConversationId, UserPair, Username};
use crate::error::{ConflictError, Error, Result};
use crate::port::inbound::ChatTarget;
use crate::port::outbound::store::ChatStore;

pub struct ChatResolver<S> {
    store: Arc<S>,
    locks: KeyedLocks<UserPair>,
}

impl<S> ChatResolver<S>
where
    S: ChatStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// The single conversation between `user_a` and `user_b`, created with
    /// the parties in the given order if none exists yet.
    ///
    /// # Errors
    /// `Domain` if either name is blank or both are the same user.
    pub async fn resolve(&self, user_a: &str, user_b: &str) -> Result<Conversation> {
        let user_a = Username::parse(user_a, "user_a")?;
        let user_b = Username::parse(user_b, "user_b")?;
        let pair = UserPair::new(user_a.clone(), user_b.clone())?;

        if let Some(existing) = self.store.find_conversation(&pair).await? {
            return Ok(existing);
        }

        let _guard = self.locks.lock(pair.clone()).await;

        if let Some(existing) = self.store.find_conversation(&pair).await? {
            debug!(conversation = %existing.id, "Conversation created by concurrent caller");
            return Ok(existing);
        }

        let conversation = Conversation::open(user_a, user_b)?;
        match self.store.insert_conversation(&conversation).await {
            Ok(()) => {
                info!(
                    conversation = %conversation.id,
                    user_a = %conversation.user_a,
                    user_b = %conversation.user_b,
                    "Conversation created"
                );
                Ok(conversation)
            }
            Err(Error::Conflict(ConflictError::DuplicateConversation { .. })) => {
                debug!(
                    discarded = %conversation.id,
                    low = %pair.low(),
                    high = %pair.high(),
                    "Lost conversation creation race, reading winner"
                );
                self.store
                    .find_conversation(&pair)
                    .await?
                    .ok_or_else(|| Error::not_found("conversation", pair_label(&pair)))
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a send target: an existing conversation, or a user pair.
    pub async fn resolve_target(&self, target: &ChatTarget) -> Result<Conversation> {
        match target {
            ChatTarget::Conversation(id) => self.get(id).await,
            ChatTarget::Users { user_a, user_b } => self.resolve(user_a, user_b).await,
        }
    }

    pub async fn get(&self, id: &ConversationId) -> Result<Conversation> {
        self.store
            .get_conversation(id)
            .await?
            .ok_or_else(|| Error::not_found("conversation", id))
    }

    /// Every conversation `user` takes part in, oldest first.
    pub async fn conversations_for(&self, user: &str) -> Result<Vec<Conversation>> {
        let user = Username::parse(user, "user")?;
        self.store.list_conversations(&user).await
    }

    /// Remove a conversation and its messages. Returns the message count.
    pub async fn delete(&self, id: &ConversationId) -> Result<usize> {
        let removed = self
            .store
            .delete_conversation(id)
            .await?
            .ok_or_else(|| Error::not_found("conversation", id))?;
        info!(conversation = %id, messages = removed, "Conversation deleted");
        Ok(removed)
    }

    pub(crate) fn store(&self) -> &Arc<S> {
        &self.store
    }
}

fn pair_label(pair: &UserPair) -> String {
    format!("{}/{}", pair.low(), pair.high())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resolver() -> ChatResolver<MemoryStore> {
        ChatResolver::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn resolve_is_symmetric() {
        let resolver = resolver();
        let first = resolver.resolve("alice", "bob").await.unwrap();
        let second = resolver.resolve("bob", "alice").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.user_a.as_str(), "alice");
        assert_eq!(resolver.conversations_for("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn self_conversation_is_invalid() {
        let err = resolver().resolve("alice", "alice").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn target_by_unknown_id_is_not_found() {
        let err = resolver()
            .resolve_target(&ChatTarget::Conversation(ConversationId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    /// Hides existing conversations from the first `blind` lookups, as if
    /// another process inserted right after we looked.
    struct LateWinner {
        inner: MemoryStore,
        blind: AtomicUsize,
    }

    impl ChatStore for LateWinner {
        async fn find_conversation(&self, pair: &UserPair) -> Result<Option<Conversation>> {
            let remaining = self.blind.load(Ordering::SeqCst);
            if remaining > 0 {
                self.blind.store(remaining - 1, Ordering::SeqCst);
                return Ok(None);
            }
            self.inner.find_conversation(pair).await
        }

        async fn get_conversation(&self, id: &ConversationId) -> Result<Option<Conversation>> {
            self.inner.get_conversation(id).await
        }

        async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
            self.inner.insert_conversation(conversation).await
        }

        async fn list_conversations(&self, user: &Username) -> Result<Vec<Conversation>> {
            self.inner.list_conversations(user).await
        }

        async fn delete_conversation(&self, id: &ConversationId) -> Result<Option<usize>> {
            self.inner.delete_conversation(id).await
        }

        async fn append_message(&self, message: &crate::domain::Message) -> Result<()> {
            self.inner.append_message(message).await
        }

        async fn list_messages(&self, id: &ConversationId) -> Result<Vec<crate::domain::Message>> {
            self.inner.list_messages(id).await
        }
    }

    #[tokio::test]
    async fn losing_insert_returns_winner() {
        let store = Arc::new(LateWinner {
            inner: MemoryStore::new(),
            blind: AtomicUsize::new(0),
        });
        let winner = Conversation::open(
            Username::parse("bob", "user").unwrap(),
            Username::parse("alice", "user").unwrap(),
        )
        .unwrap();
        store.inner.insert_conversation(&winner).await.unwrap();
        store.blind.store(2, Ordering::SeqCst);

        let resolver = ChatResolver::new(Arc::clone(&store));
        let resolved = resolver.resolve("alice", "bob").await.unwrap();

        assert_eq!(resolved.id, winner.id);
        assert_eq!(
            store
                .inner
                .list_conversations(&Username::parse("alice", "user").unwrap())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn delete_cascades_and_reports_missing() {
        let resolver = resolver();
        let conv = resolver.resolve("alice", "bob").await.unwrap();

        assert_eq!(resolver.delete(&conv.id).await.unwrap(), 0);
        assert_eq!(
            resolver.delete(&conv.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );

        let fresh = resolver.resolve("bob", "alice").await.unwrap();
        assert_ne!(fresh.id, conv.id);
    }
}
