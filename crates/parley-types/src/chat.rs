//! Chat turn types for Parley.
//!
//! A user's conversation is an append-only sequence of turns. The sequence is
//! replayed to the LLM provider as context on every new message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Maximum length (in characters) of a user-authored turn.
pub const MAX_USER_TURN_CHARS: usize = 1000;

/// One message in a conversation, tagged with its speaker role.
///
/// Turns are never mutated after creation. They are removed only in bulk
/// when a user clears their history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// A turn authored by the user.
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp,
        }
    }

    /// A turn produced by the model.
    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

/// Response body for endpoints that return the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    pub chats: Vec<ChatTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_roles() {
        let now = Utc::now();
        assert_eq!(ChatTurn::user("hi", now).role, MessageRole::User);
        assert_eq!(ChatTurn::assistant("hello", now).role, MessageRole::Assistant);
    }

    #[test]
    fn test_turn_serde_uses_lowercase_role() {
        let turn = ChatTurn::assistant("hello", Utc::now());
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hello");
        assert!(json["timestamp"].is_string());
    }
}
