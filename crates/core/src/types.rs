use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A platform user identifier.
pub type UserId = i64;

/// A platform message identifier, unique within its chat.
pub type MessageId = i64;

/// The character separating payload from signature inside a token.
///
/// File identifiers must never contain it.
pub const TOKEN_DELIMITER: char = '.';

/// Opaque identifier of a stored file record.
///
/// Generated identifiers are UUIDv4 values in simple form (32 lowercase hex
/// characters), so they never contain [`TOKEN_DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh, random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Validate an identifier coming from outside (tokens, CLI arguments).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidFileId("must not be empty".to_owned()));
        }
        if trimmed.contains(TOKEN_DELIMITER) {
            return Err(CoreError::InvalidFileId(format!(
                "must not contain '{TOKEN_DELIMITER}'"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Return the inner string as a str slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to a chat, as accepted by the platform's `chat_id` parameters.
///
/// Numeric identifiers (including negative channel ids such as
/// `-1001234567890`) become [`ChatRef::Id`]; anything else is passed through
/// verbatim as [`ChatRef::Handle`], usually an `@channel` username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatRef {
    Id(i64),
    Handle(String),
}

impl ChatRef {
    /// Parse a raw configuration value into a chat reference.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Handle(trimmed.to_owned()),
        }
    }
}

impl From<i64> for ChatRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Handle(handle) => f.write_str(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_delimiter_free_and_unique() {
        let a = FileId::generate();
        let b = FileId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(!a.as_str().contains(TOKEN_DELIMITER));
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_rejects_empty_and_delimiter() {
        assert!(FileId::parse("  ").is_err());
        assert!(FileId::parse("abc.def").is_err());
        assert_eq!(FileId::parse(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn file_id_serializes_transparently() {
        let id = FileId::parse("deadbeef").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"deadbeef\"");
    }

    #[test]
    fn chat_ref_parse() {
        assert_eq!(ChatRef::parse("-1001234"), ChatRef::Id(-1_001_234));
        assert_eq!(ChatRef::parse(" @news "), ChatRef::Handle("@news".into()));
    }

    #[test]
    fn chat_ref_serializes_untagged() {
        assert_eq!(serde_json::to_string(&ChatRef::Id(-42)).unwrap(), "-42");
        assert_eq!(
            serde_json::to_string(&ChatRef::Handle("@news".into())).unwrap(),
            "\"@news\""
        );
        let back: ChatRef = serde_json::from_str("-42").unwrap();
        assert_eq!(back, ChatRef::Id(-42));
    }
}
