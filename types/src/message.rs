//! Conversation message model.
//!
//! Messages arrive already normalized by an ingestion collaborator. The core
//! only reads them; nothing here is mutated after construction.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    text: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Error)]
#[error("transcript must contain at least one message")]
pub struct EmptyTranscriptError;

/// A conversation guaranteed to hold at least one message.
///
/// Empty transcripts are the one malformed input the core refuses outright;
/// they are rejected here so every downstream stage can assume content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new(messages: Vec<Message>) -> Result<Self, EmptyTranscriptError> {
        if messages.is_empty() {
            Err(EmptyTranscriptError)
        } else {
            Ok(Self(messages))
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    /// All message texts joined by newlines, in conversation order.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.0
            .iter()
            .map(Message::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Message> {
        self.0
    }
}

impl TryFrom<Vec<Message>> for Transcript {
    type Error = EmptyTranscriptError;

    fn try_from(value: Vec<Message>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Transcript> for Vec<Message> {
    fn from(value: Transcript) -> Self {
        value.0
    }
}

impl Deref for Transcript {
    type Target = [Message];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, Role, Transcript};

    #[test]
    fn transcript_rejects_empty() {
        assert!(Transcript::new(Vec::new()).is_err());
    }

    #[test]
    fn transcript_joins_in_order() {
        let transcript =
            Transcript::new(vec![Message::user("first"), Message::assistant("second")]).unwrap();
        assert_eq!(transcript.joined_text(), "first\nsecond");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role(), Role::Assistant);
    }

    #[test]
    fn transcript_deserialize_rejects_empty_array() {
        let result: Result<Transcript, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }

    #[test]
    fn message_roundtrips_lowercase_role() {
        let json = r#"{"role":"user","text":"hi"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.role(), Role::User);
        assert_eq!(message.text(), "hi");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
