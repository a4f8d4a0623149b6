//! Request shapes accepted by the application services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ConversationId, SubjectId};

/// A vote as submitted by a client.
///
/// `requested` is the raw wire value; anything outside `{-1, 0, 1}` is
/// rejected before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub subject: SubjectId,
    pub voter: String,
    pub requested: i64,
}

impl VoteRequest {
    pub fn new(subject: SubjectId, voter: impl Into<String>, requested: i64) -> Self {
        Self {
            subject,
            voter: voter.into(),
            requested,
        }
    }
}

/// A question as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub author: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub topic: Option<String>,
}

impl NewQuestion {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn on_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// Where a message should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatTarget {
    /// The conversation between two users, created on first contact.
    Users { user_a: String, user_b: String },
    /// An existing conversation.
    Conversation(ConversationId),
}

/// A message-send request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub target: ChatTarget,
    pub from_user: String,
    pub text: String,
    /// Display timestamp; defaults to now.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

impl SendMessage {
    /// Message to the conversation between `from_user` and `to_user`.
    pub fn direct(
        from_user: impl Into<String>,
        to_user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let from_user = from_user.into();
        Self {
            target: ChatTarget::Users {
                user_a: from_user.clone(),
                user_b: to_user.into(),
            },
            from_user,
            text: text.into(),
            sent_at: None,
        }
    }

    /// Message to an existing conversation.
    pub fn reply(
        conversation: ConversationId,
        from_user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            target: ChatTarget::Conversation(conversation),
            from_user: from_user.into(),
            text: text.into(),
            sent_at: None,
        }
    }
}
