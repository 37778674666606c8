//! Builds the upstream context from persisted conversation history.

use std::sync::Arc;

use crate::domain::foundation::{ConversationId, MessageId};
use crate::domain::history::{self, HistoryMessage};
use crate::ports::{ConversationStore, StoreError};

/// Projects a conversation's stored messages into completion history.
///
/// Pure read: fetches every message ordered ascending by creation time and
/// maps each to its role and content. Called once per session, immediately
/// before the upstream request is assembled.
#[derive(Clone)]
pub struct HistoryBuilder {
    conversations: Arc<dyn ConversationStore>,
}

impl HistoryBuilder {
    /// Creates a builder over the given store.
    pub fn new(conversations: Arc<dyn ConversationStore>) -> Self {
        Self { conversations }
    }

    /// Full history for a conversation, oldest first.
    pub async fn build(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<HistoryMessage>, StoreError> {
        let messages = self.conversations.list_messages(conversation_id).await?;
        Ok(history::project(&messages))
    }

    /// History without one message.
    ///
    /// The current turn is persisted before its completion call; excluding
    /// it here keeps the turn out of the context it is itself the prompt
    /// for.
    pub async fn build_excluding(
        &self,
        conversation_id: &ConversationId,
        exclude: &MessageId,
    ) -> Result<Vec<HistoryMessage>, StoreError> {
        let messages = self.conversations.list_messages(conversation_id).await?;
        let retained: Vec<_> = messages
            .into_iter()
            .filter(|m| m.id() != exclude)
            .collect();
        Ok(history::project(&retained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Conversation, Message, Role};
    use crate::domain::foundation::UserId;
    use crate::ports::{Page, PageRequest};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedMessageStore {
        messages: Mutex<Vec<Message>>,
    }

    impl FixedMessageStore {
        fn with_messages(messages: Vec<Message>) -> Self {
            Self {
                messages: Mutex::new(messages),
            }
        }
    }

    #[async_trait]
    impl ConversationStore for FixedMessageStore {
        async fn create(&self, _conversation: &Conversation) -> Result<(), StoreError> {
            unimplemented!("Not needed for these tests")
        }

        async fn update(&self, _conversation: &Conversation) -> Result<(), StoreError> {
            unimplemented!("Not needed for these tests")
        }

        async fn find_for_user(
            &self,
            _id: &ConversationId,
            _user_id: &UserId,
        ) -> Result<Option<Conversation>, StoreError> {
            unimplemented!("Not needed for these tests")
        }

        async fn list_for_user(
            &self,
            _user_id: &UserId,
            _page: PageRequest,
        ) -> Result<Page<Conversation>, StoreError> {
            unimplemented!("Not needed for these tests")
        }

        async fn add_message(&self, _message: &Message) -> Result<(), StoreError> {
            unimplemented!("Not needed for these tests")
        }

        async fn list_messages(
            &self,
            conversation_id: &ConversationId,
        ) -> Result<Vec<Message>, StoreError> {
            let messages = self.messages.lock().unwrap();
            Ok(messages
                .iter()
                .filter(|m| m.conversation_id() == conversation_id)
                .cloned()
                .collect())
        }

        async fn count_messages(&self, _conversation_id: &ConversationId) -> Result<u64, StoreError> {
            unimplemented!("Not needed for these tests")
        }

        async fn delete(&self, _id: &ConversationId) -> Result<(), StoreError> {
            unimplemented!("Not needed for these tests")
        }
    }

    fn exchange(conversation_id: ConversationId) -> Vec<Message> {
        vec![
            Message::user(conversation_id, "What is Rust?").unwrap(),
            Message::assistant(conversation_id, "A systems language.", None),
        ]
    }

    #[tokio::test]
    async fn builds_roles_and_content_in_order() {
        let conversation_id = ConversationId::new();
        let store = Arc::new(FixedMessageStore::with_messages(exchange(conversation_id)));
        let builder = HistoryBuilder::new(store);

        let history = builder.build(&conversation_id).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "What is Rust?");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "A systems language.");
    }

    #[tokio::test]
    async fn empty_conversation_builds_empty_history() {
        let store = Arc::new(FixedMessageStore::with_messages(Vec::new()));
        let builder = HistoryBuilder::new(store);

        let history = builder.build(&ConversationId::new()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn build_excluding_drops_only_the_named_message() {
        let conversation_id = ConversationId::new();
        let mut messages = exchange(conversation_id);
        let current = Message::user(conversation_id, "And ownership?").unwrap();
        let current_id = *current.id();
        messages.push(current);

        let store = Arc::new(FixedMessageStore::with_messages(messages));
        let builder = HistoryBuilder::new(store);

        let history = builder
            .build_excluding(&conversation_id, &current_id)
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.content != "And ownership?"));
    }
}
