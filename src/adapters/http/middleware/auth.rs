//! Bearer-token middleware and the extractors that enforce it.
//!
//! `auth_middleware` validates the Bearer token on every request that
//! carries one and stashes the resolved [`AuthenticatedUser`] (plus the
//! raw [`BearerToken`], for revocation endpoints) in request extensions.
//! Requests without a token pass through untouched; enforcement happens
//! at the handler via the [`RequireAuth`] extractor, so public routes
//! and protected routes share one middleware stack.
//!
//! Verification is delegated to [`AuthService::verify_token`], which
//! checks the JWT signature, expiry, and the revocation cache.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::auth::AuthService;
use crate::domain::foundation::AuthenticatedUser;

/// The raw bearer token a request authenticated with.
///
/// Logout needs the exact credential presented, not just the identity it
/// proved, so the middleware stores both.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Pulls the token out of the `Authorization: Bearer <token>` header.
///
/// Returns `None` for a missing header, a non-UTF-8 value, or any other
/// scheme.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Token-validating middleware for the `/api` scope.
///
/// A present-but-invalid token is rejected here with the standard 401
/// envelope. An absent token is not an error at this layer.
pub async fn auth_middleware(
    State(auth): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Response {
    match bearer_token(request.headers()) {
        Some(token) => match auth.verify_token(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
                request.extensions_mut().insert(BearerToken(token));
                next.run(request).await
            }
            Err(e) => e.into_response(),
        },
        None => next.run(request).await,
    }
}

/// Extractor for handlers that refuse anonymous callers.
///
/// Reads the user the middleware stashed in extensions; absence means the
/// request never authenticated, and the extractor rejects with 401.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

impl<S> axum::extract::FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<BearerToken>()
                .cloned()
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Why an extractor refused the request.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required")
            }
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHORIZED"
            })),
        )
            .into_response()
    }
}
