//! Axum router composition.
//!
//! Builds the full application router from handler state plus the
//! middleware that surrounds it. The same composition serves `main` and
//! the integration tests, so wiring bugs show up in both.

use std::time::Duration;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers::{auth, chat, conversations, health, models};
use super::middleware::{auth_middleware, chat_rate_limit, RateLimitGate};
use super::state::AppState;
use crate::config::ServerConfig;

/// Chat endpoints.
///
/// Routes:
/// - `POST /chat` - Send a message, full reply in one response
/// - `POST /chat/stream` - Send a message, reply streamed over SSE
///
/// Both sit behind the per-user rate-limit gate (applied by the caller)
/// and deliberately carry no request timeout: a live completion stream
/// can legitimately outlast any sensible request deadline.
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::send_message))
        .route("/chat/stream", post(chat::stream_message))
}

/// Account endpoints.
///
/// Routes:
/// - `POST /auth/register` - Create an account, returns a token
/// - `POST /auth/login` - Exchange credentials for a token
/// - `POST /auth/logout` - Revoke the presented token
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

/// Conversation endpoints.
///
/// Routes:
/// - `POST /conversations` - Start an empty conversation
/// - `GET /conversations` - Caller's conversations, newest-updated first
/// - `GET /conversations/:id` - A single conversation
/// - `GET /conversations/:id/messages` - Messages oldest first
/// - `DELETE /conversations/:id` - Remove a conversation and its messages
fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/conversations/:id/messages",
            get(conversations::list_messages),
        )
        .route(
            "/conversations/:id",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
}

/// Model catalog endpoints.
///
/// Routes:
/// - `GET /models` - Full upstream catalog
/// - `GET /models/free` - Zero-cost entries only
/// - `POST /models/refresh` - Drop the cached catalog
fn model_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(models::list_models))
        .route("/models/free", get(models::list_free_models))
        .route("/models/refresh", post(models::refresh_models))
}

/// Builds the complete application router.
///
/// Layering, outermost first: request-id stamping, request traces, CORS,
/// then per-route middleware. Authentication wraps everything under
/// `/api`; the rate-limit gate wraps only the chat routes and runs after
/// authentication so a missing token yields 401, not 429. The request
/// timeout covers every API route except chat.
pub fn app_router(state: AppState, gate: RateLimitGate, server: &ServerConfig) -> Router {
    let chat = chat_routes().route_layer(middleware::from_fn_with_state(gate, chat_rate_limit));

    let timed = auth_routes()
        .merge(conversation_routes())
        .merge(model_routes())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )));

    let api = chat.merge(timed).layer(middleware::from_fn_with_state(
        state.auth.clone(),
        auth_middleware,
    ));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&server.cors_origins_list())),
        )
        .with_state(state)
}

/// CORS policy from configuration.
///
/// No configured origins means a permissive policy, which suits local
/// development; production deployments list their frontends explicitly.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// JSON body for unmatched paths.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Resource not found",
            "code": "NOT_FOUND"
        })),
    )
        .into_response()
}
