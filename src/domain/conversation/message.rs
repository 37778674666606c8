//! Message entity for conversations.
//!
//! A message is written once and never edited. Each belongs to exactly one
//! conversation and carries a role, text content, an optional model
//! identifier, and an optional image reference in data-URI form.

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human input.
    User,
    /// Model-generated reply.
    Assistant,
}

impl Role {
    /// Lowercase token used in completion histories and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// A single turn inside a conversation.
///
/// # Invariants
///
/// - `id` is globally unique
/// - a message exists only as part of its conversation
/// - `created_at` is fixed at construction; ordering within a conversation
///   is creation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique message id.
    id: MessageId,

    /// Conversation this message belongs to.
    conversation_id: ConversationId,

    /// Author of the turn.
    role: Role,

    /// Text body.
    content: String,

    /// Model that produced the turn, recorded for assistant replies.
    model: Option<String>,

    /// Data-URI image attached to a user turn.
    image: Option<String>,

    /// Instant the message was written.
    created_at: Timestamp,
}

impl Message {
    /// Builds a user turn bound to `conversation_id`.
    ///
    /// # Errors
    ///
    /// Fails with `EmptyField` when `content` trims to nothing.
    pub fn user(
        conversation_id: ConversationId,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }

        Ok(Self {
            id: MessageId::new(),
            conversation_id,
            role: Role::User,
            content,
            model: None,
            image: None,
            created_at: Timestamp::now(),
        })
    }

    /// Builds an assistant turn, optionally tagged with the producing model.
    ///
    /// Empty content is legal here: an upstream stream can complete without
    /// emitting a single fragment, and the turn is persisted as-is.
    pub fn assistant(
        conversation_id: ConversationId,
        content: impl Into<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: Role::Assistant,
            content: content.into(),
            model,
            image: None,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches a data-URI image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Tags the turn with the model that handled it.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Rebuilds a message from stored fields, trusting them as written.
    pub fn reconstitute(
        id: MessageId,
        conversation_id: ConversationId,
        role: Role,
        content: String,
        model: Option<String>,
        image: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            role,
            content,
            model,
            image,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Message id.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Owning conversation.
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Author role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Producing model, when recorded.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Attached image, when present.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Creation instant.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// True for user-authored turns.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// True for assistant-authored turns.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
