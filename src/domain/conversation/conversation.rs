//! Conversation entity - owns the chat history for one user.

use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A conversation between one user and the assistant.
///
/// Messages are stored separately, keyed by conversation, in creation
/// order. The title starts as a default sentinel and is rewritten at most
/// once, after the first exchange completes.
///
/// # Invariants
///
/// - belongs to exactly one user; only that user's requests may read or
///   mutate it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    user_id: UserId,
    title: String,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Title given to every conversation at creation.
    pub const DEFAULT_TITLE: &'static str = "New Conversation";

    /// Maximum title length, in characters, when derived from a message.
    pub const MAX_TITLE_LENGTH: usize = 50;

    /// Suffix appended when a derived title is truncated.
    pub const TITLE_ELLIPSIS: &'static str = "...";

    /// Creates a new conversation for a user with the default title.
    pub fn new(user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            user_id,
            title: Self::DEFAULT_TITLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a conversation from stored fields.
    pub fn reconstitute(
        id: ConversationId,
        user_id: UserId,
        title: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            created_at,
            updated_at,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns true if the title still equals the default sentinel.
    pub fn has_default_title(&self) -> bool {
        self.title == Self::DEFAULT_TITLE
    }

    // === Mutations ===

    /// Replaces the title and bumps the update timestamp.
    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Bumps the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    // === Title rule ===

    /// Returns true if a finished first exchange should rewrite the title.
    ///
    /// The rewrite happens only while the title is still the default
    /// sentinel and the conversation holds at most two messages (the first
    /// user/assistant pair). Later turns push the count past the threshold,
    /// so the rewrite fires at most once in practice.
    pub fn should_adopt_title(&self, total_messages: usize) -> bool {
        self.has_default_title() && total_messages <= 2
    }

    /// Derives a title from the text that started the session.
    ///
    /// Takes the first [`Self::MAX_TITLE_LENGTH`] characters and appends an
    /// ellipsis when the source was longer. Counts characters, not bytes,
    /// so multibyte input never splits mid-character.
    pub fn derived_title(source: &str) -> String {
        let mut title: String = source.chars().take(Self::MAX_TITLE_LENGTH).collect();
        if source.chars().count() > Self::MAX_TITLE_LENGTH {
            title.push_str(Self::TITLE_ELLIPSIS);
        }
        title
    }
}
