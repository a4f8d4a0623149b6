//! Message delivery into resolved conversations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::resolver::ChatResolver;
use crate::domain::{Conversation, ConversationId, DomainError, Message, Username};
use crate::error::Result;
use crate::port::inbound::{ChatTarget, SendMessage};
use crate::port::outbound::store::ChatStore;

/// A stored message together with the conversation it landed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivered {
    pub conversation: Conversation,
    pub message: Message,
}

/// Appends and lists messages.
pub struct Messenger<S> {
    resolver: ChatResolver<S>,
}

impl<S> Messenger<S>
where
    S: ChatStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: ChatResolver::new(store),
        }
    }

    /// The resolver used to find conversations.
    pub fn resolver(&self) -> &ChatResolver<S> {
        &self.resolver
    }

    /// Append a message to an existing conversation.
    ///
    /// # Errors
    /// - `Domain` for blank text or a sender outside the conversation
    /// - `NotFound` if the conversation does not exist
    pub async fn append(
        &self,
        conversation: &ConversationId,
        from_user: &str,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Message> {
        let from_user = Username::parse(from_user, "from_user")?;
        if text.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        let conversation = self.resolver.get(conversation).await?;
        self.store(&conversation, from_user, text, sent_at).await
    }

    /// Deliver a message, opening the conversation on first contact.
    ///
    /// The request is validated in full before any conversation is created.
    pub async fn send(&self, request: SendMessage) -> Result<Delivered> {
        let from_user = Username::parse(&request.from_user, "from_user")?;
        if request.text.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }
        if let ChatTarget::Users { user_a, user_b } = &request.target {
            let a = Username::parse(user_a, "user_a")?;
            let b = Username::parse(user_b, "user_b")?;
            if from_user != a && from_user != b {
                return Err(DomainError::NotAParty {
                    user: from_user.to_string(),
                }
                .into());
            }
        }

        let conversation = self.resolver.resolve_target(&request.target).await?;
        let sent_at = request.sent_at.unwrap_or_else(Utc::now);
        let message = self
            .store(&conversation, from_user, &request.text, sent_at)
            .await?;

        Ok(Delivered {
            conversation,
            message,
        })
    }

    /// Messages of a conversation in the order they were appended.
    pub async fn history(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        self.resolver.get(conversation).await?;
        self.resolver.store().list_messages(conversation).await
    }

    async fn store(
        &self,
        conversation: &Conversation,
        from_user: Username,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Message> {
        let message = Message::compose(conversation, from_user, text, sent_at)?;
        self.resolver.store().append_message(&message).await?;
        info!(
            conversation = %conversation.id,
            message = %message.id,
            from = %message.from_user,
            "Message appended"
        );
        Ok(message)
    }
}
