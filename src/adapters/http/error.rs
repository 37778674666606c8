//! HTTP error responses.
//!
//! Every error leaving the API has the same JSON shape:
//! `{"error": <message>, "code": <CODE>}`. Internal and upstream errors
//! are logged with their detail but reach the client with a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::foundation::ChatError;

/// JSON body for error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

/// Maps an error to its response status.
fn status_for(error: &ChatError) -> StatusCode {
    match error {
        ChatError::NotFound { .. } => StatusCode::NOT_FOUND,
        ChatError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        ChatError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ChatError::Validation(_) => StatusCode::BAD_REQUEST,
        ChatError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        ChatError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message exposed to the client.
///
/// Upstream and internal detail stays in the logs.
fn client_message(error: &ChatError) -> String {
    match error {
        ChatError::Upstream { status, .. } => {
            format!("Upstream completion service failed ({})", status)
        }
        ChatError::Internal { .. } => "An internal error occurred".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        match &self {
            ChatError::Internal { message } => {
                tracing::error!(error = %message, "Internal error");
            }
            ChatError::Upstream {
                status: upstream_status,
                detail,
                endpoint,
            } => {
                tracing::error!(
                    status = upstream_status,
                    endpoint = %endpoint,
                    detail = %detail,
                    "Upstream error"
                );
            }
            _ => {}
        }

        let body = ErrorBody::new(client_message(&self), self.code());
        (status, Json(body)).into_response()
    }
}
