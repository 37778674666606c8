//! HTTP handlers for conversation management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::{
    ConversationPage, ConversationSummary, ListConversationsQuery, MessageResponse,
};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::domain::conversation::Conversation;
use crate::domain::foundation::{ChatError, ConversationId, ValidationError};

/// POST /api/conversations - Start an empty conversation with the default title
pub async fn create_conversation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, ChatError> {
    let conversation = Conversation::new(user.id);
    state.conversations.create(&conversation).await?;
    Ok((
        StatusCode::CREATED,
        Json(ConversationSummary::from(conversation)),
    )
        .into_response())
}

/// GET /api/conversations - List the caller's conversations, paged
pub async fn list_conversations(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Response, ChatError> {
    let page = state
        .conversations
        .list_for_user(&user.id, query.page_request())
        .await?;
    Ok((StatusCode::OK, Json(ConversationPage::from(page))).into_response())
}

/// GET /api/conversations/:id - A single conversation, if the caller owns it
pub async fn get_conversation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, ChatError> {
    let id = parse_conversation_id(&id)?;
    let conversation = state
        .conversations
        .find_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| ChatError::not_found("Conversation"))?;
    Ok((StatusCode::OK, Json(ConversationSummary::from(conversation))).into_response())
}

/// GET /api/conversations/:id/messages - Message history, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, ChatError> {
    let id = parse_conversation_id(&id)?;
    require_owned(&state, &id, &user.id).await?;

    let messages = state.conversations.list_messages(&id).await?;
    let body: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// DELETE /api/conversations/:id - Delete a conversation and its messages
pub async fn delete_conversation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, ChatError> {
    let id = parse_conversation_id(&id)?;
    require_owned(&state, &id, &user.id).await?;

    state.conversations.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn parse_conversation_id(raw: &str) -> Result<ConversationId, ChatError> {
    raw.parse::<ConversationId>().map_err(|_| {
        ChatError::from(ValidationError::invalid_format(
            "conversationId",
            "not a valid UUID",
        ))
    })
}

/// Absent and foreign conversations are indistinguishable to the caller.
async fn require_owned(
    state: &AppState,
    id: &ConversationId,
    user_id: &crate::domain::foundation::UserId,
) -> Result<(), ChatError> {
    state
        .conversations
        .find_for_user(id, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ChatError::not_found("Conversation"))
}
