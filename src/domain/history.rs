//! Ordered role/content projection of a conversation's messages.
//!
//! The completion API consumes conversation history as a flat list of
//! role/content pairs. This module is the pure half of that projection:
//! fetching is left to the caller, mapping and ordering guarantees live
//! here.

use crate::domain::conversation::{Message, Role};
use serde::{Deserialize, Serialize};

/// One role/content pair in a completion history.
///
/// The role serializes to its lowercase token form (`"user"` /
/// `"assistant"`), which is the shape the upstream API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    /// Creates a history entry with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user history entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant history entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&Message> for HistoryMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role(), message.content())
    }
}

/// Projects persisted messages into completion history form.
///
/// The input must already be ordered ascending by creation time; the
/// projection preserves that order and copies content unchanged.
pub fn project(messages: &[Message]) -> Vec<HistoryMessage> {
    messages.iter().map(HistoryMessage::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConversationId;

    fn sample_messages(conv: ConversationId, n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(conv, format!("question {}", i)).unwrap()
                } else {
                    Message::assistant(conv, format!("answer {}", i), None)
                }
            })
            .collect()
    }

    #[test]
    fn project_preserves_order_and_content() {
        let conv = ConversationId::new();
        let messages = sample_messages(conv, 5);
        let history = project(&messages);

        assert_eq!(history.len(), 5);
        for (entry, message) in history.iter().zip(messages.iter()) {
            assert_eq!(entry.role, message.role());
            assert_eq!(entry.content, message.content());
        }
    }

    #[test]
    fn project_of_empty_slice_is_empty() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn history_message_serializes_role_lowercase() {
        let entry = HistoryMessage::user("hi");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");

        let entry = HistoryMessage::assistant("hello");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn from_message_maps_role_and_content() {
        let conv = ConversationId::new();
        let message = Message::assistant(conv, "the answer", Some("gpt-4o".to_string()));
        let entry = HistoryMessage::from(&message);
        assert_eq!(entry.role, Role::Assistant);
        assert_eq!(entry.content, "the answer");
    }
}
