//! HTTP handlers for chat endpoints.
//!
//! `POST /api/chat` runs a full turn and returns the reply in one body.
//! `POST /api/chat/stream` relays the turn as named SSE events:
//! `init`, repeated `content`, then a terminal `complete` or `error`.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    Json,
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::adapters::http::dto::{ChatRequest, ChatResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::chat::StreamEvent;
use crate::domain::foundation::ChatError;

/// Interval between SSE keep-alive comments.
const KEEP_ALIVE_SECS: u64 = 15;

/// POST /api/chat - Run one turn and return the full reply
pub async fn send_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ChatError> {
    let cmd = req.into_command(user.id)?;
    let result = state.chat.send(cmd).await?;
    Ok((StatusCode::OK, Json(ChatResponse::from(result))).into_response())
}

/// POST /api/chat/stream - Run one turn as an SSE stream
///
/// Resolution failures (bad conversation id, foreign conversation) are
/// returned as regular error responses before any event is sent. Once
/// the stream starts, failures arrive as in-band `error` events.
pub async fn stream_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ChatError> {
    let cmd = req.into_command(user.id)?;
    let rx = state.chat.stream(cmd).await?;

    let stream = ReceiverStream::new(rx)
        .map(|event: StreamEvent| Ok::<Event, Infallible>(to_sse_event(&event)));

    let sse = Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)));
    Ok(sse.into_response())
}

/// Frames one session event as a named SSE event.
fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default().event(event.name()).data(event.data())
}
