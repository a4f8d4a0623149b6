//! Validated usernames.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A non-empty username.
///
/// Usernames identify voters, authors and chat parties. Surrounding
/// whitespace is trimmed; comparison is exact (case sensitive), matching how
/// the upstream account service issues names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username.
    ///
    /// `field` names the request field for the error message.
    pub fn parse(raw: impl AsRef<str>, field: &'static str) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyUsername { field });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value, "username")
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let name = Username::parse("  alice ", "voter").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(
            Username::parse("   ", "voter"),
            Err(DomainError::EmptyUsername { field: "voter" })
        );
        assert!(Username::parse("", "author").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Username = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(ok.as_str(), "bob");
        assert!(serde_json::from_str::<Username>("\"\"").is_err());
    }
}
