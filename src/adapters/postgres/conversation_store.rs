//! PostgreSQL implementation of ConversationStore.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{Conversation, Message, Role};
use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};
use crate::ports::{ConversationStore, Page, PageRequest, StoreError};

/// PostgreSQL implementation of ConversationStore.
#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    /// Creates a new PgConversationStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(conversation.id().as_uuid())
        .bind(conversation.user_id().as_uuid())
        .bind(conversation.title())
        .bind(conversation.created_at().as_datetime())
        .bind(conversation.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert conversation: {}", e)))?;

        Ok(())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations SET title = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(conversation.id().as_uuid())
        .bind(conversation.title())
        .bind(conversation.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to update conversation: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Conversation"));
        }

        Ok(())
    }

    async fn find_for_user(
        &self,
        id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch conversation: {}", e)))?;

        row.map(row_to_conversation).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Conversation>, StoreError> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversations WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    StoreError::database(format!("Failed to count conversations: {}", e))
                })?;

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(page.size as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to list conversations: {}", e)))?;

        let items: Result<Vec<Conversation>, StoreError> =
            rows.into_iter().map(row_to_conversation).collect();

        Ok(Page::new(items?, page, total.0 as u64))
    }

    async fn add_message(&self, message: &Message) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, model, image_data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.conversation_id().as_uuid())
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(message.model())
        .bind(message.image())
        .bind(message.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                StoreError::not_found("Conversation")
            }
            _ => StoreError::database(format!("Failed to insert message: {}", e)),
        })?;

        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, model, image_data, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch messages: {}", e)))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn count_messages(&self, conversation_id: &ConversationId) -> Result<u64, StoreError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::database(format!("Failed to count messages: {}", e)))?;

        Ok(result.0 as u64)
    }

    async fn delete(&self, id: &ConversationId) -> Result<(), StoreError> {
        // Messages cascade via their foreign key.
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to delete conversation: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Conversation"));
        }

        Ok(())
    }
}

// === Helper Functions ===

fn row_to_conversation(row: sqlx::postgres::PgRow) -> Result<Conversation, StoreError> {
    let id: uuid::Uuid = row.get("id");
    let user_id: uuid::Uuid = row.get("user_id");
    let title: String = row.get("title");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    Ok(Conversation::reconstitute(
        ConversationId::from_uuid(id),
        UserId::from_uuid(user_id),
        title,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<Message, StoreError> {
    let id: uuid::Uuid = row.get("id");
    let conversation_id: uuid::Uuid = row.get("conversation_id");
    let role_str: &str = row.get("role");
    let content: String = row.get("content");
    let model: Option<String> = row.get("model");
    let image: Option<String> = row.get("image_data");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    let role: Role = role_str
        .parse()
        .map_err(|_| StoreError::database(format!("Invalid message role: {}", role_str)))?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        ConversationId::from_uuid(conversation_id),
        role,
        content,
        model,
        image,
        Timestamp::from_datetime(created_at),
    ))
}
