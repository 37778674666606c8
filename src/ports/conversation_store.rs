//! Conversation store port.
//!
//! Defines the contract for persisting conversations and their messages.
//! Messages are owned by their conversation and are totally ordered by
//! creation time; that order is the order replayed into completion history.

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, UserId};
use async_trait::async_trait;

/// Repository port for conversations and messages.
///
/// Implementations must ensure:
/// - Conversations are only readable/mutable through their owning user
/// - Messages are persisted and listed in creation order
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Save a new conversation.
    ///
    /// # Errors
    ///
    /// - `Database` on persistence failure
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Update an existing conversation's title and update timestamp.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the conversation doesn't exist
    /// - `Database` on persistence failure
    async fn update(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Find a conversation by ID, scoped to its owning user.
    ///
    /// Returns `None` if the conversation does not exist or belongs to a
    /// different user; callers cannot distinguish the two cases.
    async fn find_for_user(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, StoreError>;

    /// List a user's conversations, most recently updated first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Conversation>, StoreError>;

    /// Append a message to its conversation.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the conversation doesn't exist
    /// - `Database` on persistence failure
    async fn add_message(&self, message: &Message) -> Result<(), StoreError>;

    /// List all messages of a conversation, ascending by creation time.
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, StoreError>;

    /// Count the messages of a conversation.
    async fn count_messages(&self, conversation_id: &ConversationId) -> Result<u64, StoreError>;

    /// Delete a conversation and all its messages.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the conversation doesn't exist
    /// - `Database` on persistence failure
    async fn delete(&self, id: &ConversationId) -> Result<(), StoreError>;
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Creates a page request, clamping size to at least 1.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
        }
    }

    /// Returns the row offset of this page.
    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Creates a page of items.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
            total_items,
        }
    }

    /// Returns the number of pages needed for all items.
    pub fn total_pages(&self) -> u32 {
        if self.total_items == 0 {
            0
        } else {
            ((self.total_items + self.size as u64 - 1) / self.size as u64) as u32
        }
    }
}

/// Errors from the durable stores.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Referenced row absent.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Uniqueness constraint violated.
    #[error("{resource} already exists")]
    Duplicate { resource: String },

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Creates a duplicate error.
    pub fn duplicate(resource: impl Into<String>) -> Self {
        Self::Duplicate { resource: resource.into() }
    }

    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_zero_size() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.size, 1);
    }

    #[test]
    fn page_request_offset_multiplies() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.offset(), 60);
    }

    #[test]
    fn page_request_default_is_first_twenty() {
        let req = PageRequest::default();
        assert_eq!(req.page, 0);
        assert_eq!(req.size, 20);
    }

    #[test]
    fn page_total_pages_rounds_up() {
        let page: Page<u32> = Page::new(vec![], PageRequest::new(0, 20), 41);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn page_total_pages_zero_when_empty() {
        let page: Page<u32> = Page::new(vec![], PageRequest::new(0, 20), 0);
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn store_error_displays_resource() {
        let err = StoreError::not_found("Conversation");
        assert_eq!(err.to_string(), "Conversation not found");

        let err = StoreError::duplicate("User");
        assert_eq!(err.to_string(), "User already exists");
    }

    // Trait object safety test
    #[test]
    fn conversation_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ConversationStore) {}
    }
}
