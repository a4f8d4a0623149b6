//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier with a generated UUID.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

uuid_id!(
    /// Identifier of a vote subject (a question or an answer).
    ///
    /// Generated as UUID v4 for new subjects, or constructed from an
    /// existing string for persistence.
    SubjectId
);

uuid_id!(
    /// Identifier of a single vote record.
    VoteId
);

uuid_id!(
    /// Identifier of a two-party conversation.
    ConversationId
);

uuid_id!(
    /// Identifier of a chat message.
    MessageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = SubjectId::new();
        let b = SubjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn id_roundtrips_through_string() {
        let id = ConversationId::new();
        let restored = ConversationId::from(id.to_string());
        assert_eq!(id, restored);
        assert_eq!(restored.as_str(), id.as_str());
    }
}
