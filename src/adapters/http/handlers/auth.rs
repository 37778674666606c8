//! HTTP handlers for authentication endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::adapters::http::middleware::{BearerToken, RequireAuth};
use crate::adapters::http::state::AppState;
use crate::application::auth::{LoginCommand, RegisterCommand};
use crate::domain::foundation::ChatError;

/// POST /api/auth/register - Create an account and open a session
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ChatError> {
    let cmd = RegisterCommand {
        email: req.email,
        name: req.name,
        password: req.password,
    };

    let session = state.auth.register(cmd).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))).into_response())
}

/// POST /api/auth/login - Authenticate and open a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ChatError> {
    let cmd = LoginCommand {
        email: req.email,
        password: req.password,
    };

    let session = state.auth.login(cmd).await?;
    Ok((StatusCode::OK, Json(AuthResponse::from(session))).into_response())
}

/// POST /api/auth/logout - Revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    BearerToken(token): BearerToken,
) -> Result<Response, ChatError> {
    state.auth.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
