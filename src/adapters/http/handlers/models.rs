//! HTTP handlers for the model catalog.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::ModelResponse;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;

/// GET /api/models - Full catalog
pub async fn list_models(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Response {
    let models = state.catalog.all().await;
    let body: Vec<ModelResponse> = models.into_iter().map(Into::into).collect();
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/models/free - Entries with zero prompt and completion pricing
pub async fn list_free_models(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Response {
    let models = state.catalog.free().await;
    let body: Vec<ModelResponse> = models.into_iter().map(Into::into).collect();
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/models/refresh - Drop the cached catalog so the next read refetches
pub async fn refresh_models(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Response {
    state.catalog.invalidate().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Models cache refreshed successfully"
        })),
    )
        .into_response()
}
