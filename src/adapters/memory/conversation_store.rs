//! In-memory conversation store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::{ConversationStore, Page, PageRequest, StoreError};

/// In-memory conversation store for tests and single-process runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations, for test assertions.
    pub async fn conversation_count(&self) -> usize {
        self.inner.read().await.conversations.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.conversations.contains_key(&conversation.id()) {
            return Err(StoreError::duplicate("conversation"));
        }
        inner
            .conversations
            .insert(conversation.id(), conversation.clone());
        inner.messages.entry(conversation.id()).or_default();
        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.conversations.get_mut(&conversation.id()) {
            Some(existing) => {
                *existing = conversation.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("conversation")),
        }
    }

    async fn find_for_user(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .conversations
            .get(id)
            .filter(|c| c.user_id() == *user_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Conversation>, StoreError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.user_id() == *user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at().as_datetime().cmp(&a.updated_at().as_datetime()));

        let total = owned.len() as u64;
        let items: Vec<Conversation> = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn add_message(&self, message: &Message) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.conversations.contains_key(message.conversation_id()) {
            return Err(StoreError::not_found("conversation"));
        }
        inner
            .messages
            .entry(*message.conversation_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.read().await;
        let mut messages = inner
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by(|a, b| {
            a.created_at()
                .as_datetime()
                .cmp(&b.created_at().as_datetime())
        });
        Ok(messages)
    }

    async fn count_messages(&self, conversation_id: &ConversationId) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .messages
            .get(conversation_id)
            .map(|m| m.len() as u64)
            .unwrap_or(0))
    }

    async fn delete(&self, id: &ConversationId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.conversations.remove(id).is_none() {
            return Err(StoreError::not_found("conversation"));
        }
        inner.messages.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation_for(user_id: UserId) -> Conversation {
        Conversation::new(user_id)
    }

    #[tokio::test]
    async fn create_then_find_returns_conversation() {
        let store = InMemoryConversationStore::new();
        let user_id = UserId::new();
        let conversation = conversation_for(user_id);

        store.create(&conversation).await.unwrap();

        let found = store
            .find_for_user(&conversation.id(), &user_id)
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id(), conversation.id());
    }

    #[tokio::test]
    async fn find_scoped_to_owner() {
        let store = InMemoryConversationStore::new();
        let conversation = conversation_for(UserId::new());
        store.create(&conversation).await.unwrap();

        let other_user = UserId::new();
        let found = store
            .find_for_user(&conversation.id(), &other_user)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_create_rejected() {
        let store = InMemoryConversationStore::new();
        let conversation = conversation_for(UserId::new());
        store.create(&conversation).await.unwrap();

        let result = store.create(&conversation).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn update_missing_conversation_is_not_found() {
        let store = InMemoryConversationStore::new();
        let conversation = conversation_for(UserId::new());

        let result = store.update(&conversation).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_orders_most_recently_updated_first() {
        let store = InMemoryConversationStore::new();
        let user_id = UserId::new();

        let older = conversation_for(user_id);
        store.create(&older).await.unwrap();

        let mut newer = conversation_for(user_id);
        newer.touch();
        store.create(&newer).await.unwrap();

        let page = store
            .list_for_user(&user_id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].id(), newer.id());
    }

    #[tokio::test]
    async fn list_paginates() {
        let store = InMemoryConversationStore::new();
        let user_id = UserId::new();
        for _ in 0..5 {
            store.create(&conversation_for(user_id)).await.unwrap();
        }

        let page = store
            .list_for_user(&user_id, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages(), 3);
    }

    #[tokio::test]
    async fn add_message_requires_conversation() {
        let store = InMemoryConversationStore::new();
        let message = Message::user(ConversationId::new(), "hello").unwrap();

        let result = store.add_message(&message).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn messages_listed_in_creation_order() {
        let store = InMemoryConversationStore::new();
        let conversation = conversation_for(UserId::new());
        store.create(&conversation).await.unwrap();

        let first = Message::user(conversation.id(), "first").unwrap();
        let second = Message::assistant(conversation.id(), "second", None);
        store.add_message(&first).await.unwrap();
        store.add_message(&second).await.unwrap();

        let messages = store.list_messages(&conversation.id()).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content(), "first");
        assert_eq!(messages[1].content(), "second");
        assert_eq!(store.count_messages(&conversation.id()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_removes_conversation_and_messages() {
        let store = InMemoryConversationStore::new();
        let conversation = conversation_for(UserId::new());
        store.create(&conversation).await.unwrap();
        store
            .add_message(&Message::user(conversation.id(), "hi").unwrap())
            .await
            .unwrap();

        store.delete(&conversation.id()).await.unwrap();

        assert_eq!(store.conversation_count().await, 0);
        assert!(store
            .list_messages(&conversation.id())
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            store.delete(&conversation.id()).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
