//! Two-party conversations and their messages.
//!
//! A conversation is identified by an unordered pair of usernames. The pair
//! is canonicalized ([`UserPair`]) before it is used as a lookup or
//! uniqueness key, so `(alice, bob)` and `(bob, alice)` always land on the
//! same conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ConversationId, MessageId};
use super::user::Username;

/// Unordered pair of two distinct usernames, stored in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserPair {
    low: Username,
    high: Username,
}

impl UserPair {
    /// Canonicalize two usernames into a pair.
    ///
    /// # Errors
    /// Returns [`DomainError::SelfConversation`] if both names are equal.
    pub fn new(a: Username, b: Username) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::SelfConversation {
                user: a.to_string(),
            });
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    /// Parse two raw names and canonicalize them.
    ///
    /// # Errors
    /// Returns a [`DomainError`] if either name is blank or both are equal.
    pub fn parse(a: &str, b: &str) -> Result<Self, DomainError> {
        Self::new(
            Username::parse(a, "user_a")?,
            Username::parse(b, "user_b")?,
        )
    }

    /// The lexicographically smaller name.
    #[must_use]
    pub fn low(&self) -> &Username {
        &self.low
    }

    /// The lexicographically larger name.
    #[must_use]
    pub fn high(&self) -> &Username {
        &self.high
    }

    /// Whether `user` is one of the two parties.
    #[must_use]
    pub fn contains(&self, user: &Username) -> bool {
        &self.low == user || &self.high == user
    }
}

/// A conversation between exactly two users.
///
/// `user_a`/`user_b` keep the order given by whoever opened the
/// conversation; identity is decided by [`Conversation::pair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_a: Username,
    pub user_b: Username,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Open a conversation with the parties in the order given.
    ///
    /// # Errors
    /// Returns [`DomainError::SelfConversation`] if both names are equal.
    pub fn open(user_a: Username, user_b: Username) -> Result<Self, DomainError> {
        if user_a == user_b {
            return Err(DomainError::SelfConversation {
                user: user_a.to_string(),
            });
        }
        Ok(Self {
            id: ConversationId::new(),
            user_a,
            user_b,
            created_at: Utc::now(),
        })
    }

    /// Canonical unordered pair for this conversation.
    #[must_use]
    pub fn pair(&self) -> UserPair {
        let (low, high) = if self.user_a < self.user_b {
            (self.user_a.clone(), self.user_b.clone())
        } else {
            (self.user_b.clone(), self.user_a.clone())
        };
        UserPair { low, high }
    }

    /// Whether `user` is one of the two parties.
    #[must_use]
    pub fn involves(&self, user: &Username) -> bool {
        &self.user_a == user || &self.user_b == user
    }
}

/// A message appended to a conversation.
///
/// `sent_at` is caller supplied and only used for display; list order is
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation: ConversationId,
    pub from_user: Username,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Build a message for an already resolved conversation.
    ///
    /// # Errors
    /// Returns [`DomainError::EmptyMessage`] for blank text and
    /// [`DomainError::NotAParty`] if the sender is not in the conversation.
    pub fn compose(
        conversation: &Conversation,
        from_user: Username,
        text: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        if !conversation.involves(&from_user) {
            return Err(DomainError::NotAParty {
                user: from_user.to_string(),
            });
        }
        Ok(Self {
            id: MessageId::new(),
            conversation: conversation.id.clone(),
            from_user,
            text,
            sent_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Username {
        Username::parse(s, "user").unwrap()
    }

    #[test]
    fn pair_is_order_independent() {
        let ab = UserPair::new(name("alice"), name("bob")).unwrap();
        let ba = UserPair::new(name("bob"), name("alice")).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low().as_str(), "alice");
        assert_eq!(ab.high().as_str(), "bob");
    }

    #[test]
    fn pair_rejects_same_user() {
        assert_eq!(
            UserPair::new(name("alice"), name("alice")),
            Err(DomainError::SelfConversation {
                user: "alice".into()
            })
        );
    }

    #[test]
    fn pair_parse_rejects_blank_names() {
        assert!(matches!(
            UserPair::parse("", "bob"),
            Err(DomainError::EmptyUsername { field: "user_a" })
        ));
    }

    #[test]
    fn conversation_keeps_given_order_but_canonical_pair() {
        let conv = Conversation::open(name("zed"), name("amy")).unwrap();
        assert_eq!(conv.user_a.as_str(), "zed");
        assert_eq!(conv.pair(), UserPair::parse("amy", "zed").unwrap());
    }

    #[test]
    fn compose_validates_sender_and_text() {
        let conv = Conversation::open(name("alice"), name("bob")).unwrap();
        let now = Utc::now();

        let ok = Message::compose(&conv, name("bob"), "hi", now).unwrap();
        assert_eq!(ok.conversation, conv.id);

        assert_eq!(
            Message::compose(&conv, name("bob"), "   ", now),
            Err(DomainError::EmptyMessage)
        );
        assert!(matches!(
            Message::compose(&conv, name("eve"), "hi", now),
            Err(DomainError::NotAParty { .. })
        ));
    }
}
