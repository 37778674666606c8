//! HTTP DTOs for the chat API.
//!
//! These types decouple the HTTP contract from domain types. All JSON
//! fields are camelCase.

use serde::{Deserialize, Serialize};

use crate::application::auth::AuthSession;
use crate::application::chat::{ChatCommand, SendResult};
use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ChatError, ConversationId, UserId, ValidationError};
use crate::domain::user::User;
use crate::ports::{ModelInfo, Page, PageRequest};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/chat` and `POST /api/chat/stream`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Raw base64 image payload, without data-URI prefix.
    #[serde(default)]
    pub image: Option<String>,
}

impl ChatRequest {
    /// Converts the request into a chat command for the given caller.
    ///
    /// # Errors
    ///
    /// - `Validation` if the conversation id is not a valid UUID
    pub fn into_command(self, user_id: UserId) -> Result<ChatCommand, ChatError> {
        let conversation_id = match self.conversation_id.as_deref() {
            Some(raw) => Some(raw.parse::<ConversationId>().map_err(|_| {
                ChatError::from(ValidationError::invalid_format(
                    "conversationId",
                    "not a valid UUID",
                ))
            })?),
            None => None,
        };

        Ok(ChatCommand {
            user_id,
            conversation_id,
            message: self.message,
            model: self.model,
            image: self.image,
        })
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query parameters for `GET /api/conversations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListConversationsQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

impl ListConversationsQuery {
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.size.unwrap_or(defaults.size),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub content: String,
    pub conversation_id: String,
    pub message_id: String,
}

impl From<SendResult> for ChatResponse {
    fn from(result: SendResult) -> Self {
        Self {
            content: result.content,
            conversation_id: result.conversation_id.to_string(),
            message_id: result.message_id.to_string(),
        }
    }
}

/// User identity in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

/// Response of register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: UserResponse::from(&session.user),
        }
    }
}

/// One conversation in list responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Conversation> for ConversationSummary {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id().to_string(),
            title: conversation.title().to_string(),
            created_at: conversation.created_at().as_datetime().to_rfc3339(),
            updated_at: conversation.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Paged list of conversations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPage {
    pub items: Vec<ConversationSummary>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl From<Page<Conversation>> for ConversationPage {
    fn from(page: Page<Conversation>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            page: page.page,
            size: page.size,
            total_items: page.total_items,
            total_pages,
        }
    }
}

/// One message in history responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id().to_string(),
            role: message.role().as_str(),
            content: message.content().to_string(),
            model: message.model().map(str::to_string),
            created_at: message.created_at().as_datetime().to_rfc3339(),
        }
    }
}

/// One catalog entry in model responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    pub pricing: ModelPricingResponse,
    pub supports_vision: bool,
    pub free: bool,
}

/// Pricing strings as the provider reports them.
#[derive(Debug, Clone, Serialize)]
pub struct ModelPricingResponse {
    pub prompt: String,
    pub completion: String,
}

impl From<ModelInfo> for ModelResponse {
    fn from(model: ModelInfo) -> Self {
        let free = model.is_free();
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            context_length: model.context_length,
            pricing: ModelPricingResponse {
                prompt: model.pricing.prompt,
                completion: model.pricing.completion,
            },
            supports_vision: model.supports_vision,
            free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ModelPricing;

    mod chat_request {
        use super::*;

        #[test]
        fn deserializes_camel_case() {
            let json = r#"{
                "message": "hello",
                "model": "meta-llama/llama-3.2-3b-instruct:free",
                "conversationId": "3b8f0c6e-2f6a-4f4e-9c36-9a5a3f2d1b11"
            }"#;
            let request: ChatRequest = serde_json::from_str(json).unwrap();
            assert_eq!(request.message, "hello");
            assert!(request.conversation_id.is_some());
            assert!(request.image.is_none());
        }

        #[test]
        fn into_command_parses_conversation_id() {
            let request = ChatRequest {
                message: "hello".to_string(),
                model: None,
                conversation_id: Some("3b8f0c6e-2f6a-4f4e-9c36-9a5a3f2d1b11".to_string()),
                image: None,
            };
            let cmd = request.into_command(UserId::new()).unwrap();
            assert!(cmd.conversation_id.is_some());
        }

        #[test]
        fn into_command_rejects_malformed_id() {
            let request = ChatRequest {
                message: "hello".to_string(),
                model: None,
                conversation_id: Some("42".to_string()),
                image: None,
            };
            let result = request.into_command(UserId::new());
            assert!(matches!(result, Err(ChatError::Validation(_))));
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn chat_response_uses_camel_case() {
            let result = SendResult {
                content: "answer".to_string(),
                conversation_id: ConversationId::new(),
                message_id: crate::domain::foundation::MessageId::new(),
            };
            let json = serde_json::to_value(ChatResponse::from(result)).unwrap();
            assert!(json.get("conversationId").is_some());
            assert!(json.get("messageId").is_some());
            assert!(json.get("conversation_id").is_none());
        }

        #[test]
        fn conversation_summary_carries_timestamps() {
            let conversation = Conversation::new(UserId::new());
            let json =
                serde_json::to_value(ConversationSummary::from(conversation)).unwrap();
            assert!(json.get("createdAt").is_some());
            assert!(json.get("updatedAt").is_some());
            assert_eq!(json["title"], "New Conversation");
        }

        #[test]
        fn message_response_lowercases_role() {
            let message = Message::user(ConversationId::new(), "hi").unwrap();
            let json = serde_json::to_value(MessageResponse::from(message)).unwrap();
            assert_eq!(json["role"], "user");
            // Model absent: key omitted entirely.
            assert!(json.get("model").is_none());
        }

        #[test]
        fn model_response_flags_free_models() {
            let model = ModelInfo {
                id: "test/model:free".to_string(),
                name: "Test".to_string(),
                description: None,
                context_length: Some(4096),
                pricing: ModelPricing {
                    prompt: "0".to_string(),
                    completion: "0".to_string(),
                },
                supports_vision: false,
            };
            let json = serde_json::to_value(ModelResponse::from(model)).unwrap();
            assert_eq!(json["free"], true);
            assert_eq!(json["contextLength"], 4096);
            assert_eq!(json["supportsVision"], false);
        }
    }

    mod paging {
        use super::*;

        #[test]
        fn defaults_to_first_page_of_twenty() {
            let query = ListConversationsQuery::default();
            let request = query.page_request();
            assert_eq!(request.page, 0);
            assert_eq!(request.size, 20);
        }

        #[test]
        fn page_envelope_carries_totals() {
            let conversations = vec![Conversation::new(UserId::new())];
            let page = Page::new(conversations, PageRequest::new(0, 20), 41);
            let response = ConversationPage::from(page);
            assert_eq!(response.total_items, 41);
            assert_eq!(response.total_pages, 3);
            assert_eq!(response.items.len(), 1);
        }
    }
}
