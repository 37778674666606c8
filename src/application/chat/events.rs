//! Events emitted over a streaming chat session.
//!
//! A session produces exactly one `init`, zero or more `content` fragments,
//! and terminates with either one `complete` or one `error`. The HTTP layer
//! frames these as SSE events using [`StreamEvent::name`] for the event
//! field and [`StreamEvent::data`] for the data field.

use serde::Serialize;

use crate::domain::foundation::{ConversationId, MessageId};

/// One event in a streaming chat session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// First event of every session; carries the resolved conversation.
    Init { conversation_id: ConversationId },
    /// One response fragment, in arrival order.
    Content { text: String },
    /// Terminal failure, sanitized for the client. No `complete` follows.
    Error { message: String },
    /// Terminal success; identifies the persisted assistant message.
    Complete {
        message_id: MessageId,
        conversation_id: ConversationId,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitPayload {
    conversation_id: ConversationId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletePayload {
    message_id: MessageId,
    conversation_id: ConversationId,
}

impl StreamEvent {
    /// Creates a content event.
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::Content { text: text.into() }
    }

    /// Creates an error event.
    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    /// SSE event name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Init { .. } => "init",
            StreamEvent::Content { .. } => "content",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Complete { .. } => "complete",
        }
    }

    /// SSE data field for this variant.
    ///
    /// `init` and `complete` carry JSON objects; `content` and `error`
    /// carry their text verbatim.
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Init { conversation_id } => json_payload(&InitPayload {
                conversation_id: *conversation_id,
            }),
            StreamEvent::Content { text } => text.clone(),
            StreamEvent::Error { message } => message.clone(),
            StreamEvent::Complete {
                message_id,
                conversation_id,
            } => json_payload(&CompletePayload {
                message_id: *message_id,
                conversation_id: *conversation_id,
            }),
        }
    }

    /// Returns true for `error` and `complete`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error { .. } | StreamEvent::Complete { .. })
    }
}

fn json_payload<T: Serialize>(payload: &T) -> String {
    serde_json::to_value(payload)
        .map(|v| v.to_string())
        .unwrap_or_default()
}
