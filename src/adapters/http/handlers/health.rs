//! Liveness probe.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};

/// GET /health - Unauthenticated liveness check
pub async fn health_check() -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}
