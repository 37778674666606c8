//! Rate limiting middleware for the chat endpoints.
//!
//! The gate runs after authentication and before the handler. It checks
//! the caller's sliding window via the `RateLimiter` port, rejects with
//! 429 when the window is full, and records the request otherwise.
//!
//! Limiter backend failures follow the configured policy: fail-open
//! admits the request (availability over protection), fail-secure
//! rejects it as if the window were full. Both are logged at warn.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post, middleware};
//!
//! let gate = RateLimitGate::new(limiter, true);
//! let app = Router::new()
//!     .route("/api/chat", post(handler))
//!     .route_layer(middleware::from_fn_with_state(gate, chat_rate_limit));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::foundation::{AuthenticatedUser, ChatError};
use crate::ports::{RateLimitKey, RateLimiter};

/// Admission gate state: the limiter plus its failure policy.
#[derive(Clone)]
pub struct RateLimitGate {
    limiter: Arc<dyn RateLimiter>,
    fail_open: bool,
}

impl RateLimitGate {
    /// Creates a gate over the given limiter.
    ///
    /// `fail_open` decides what happens when the limiter backend is
    /// unreachable: `true` admits, `false` rejects.
    pub fn new(limiter: Arc<dyn RateLimiter>, fail_open: bool) -> Self {
        Self { limiter, fail_open }
    }

    /// Checks admission for one caller.
    ///
    /// Returns `Err` with the rate-limit error when the request must be
    /// rejected.
    async fn admit(&self, user: &AuthenticatedUser) -> Result<(), ChatError> {
        let key = RateLimitKey::chat(user.id);

        match self.limiter.is_allowed(&key).await {
            Ok(true) => {}
            Ok(false) => return Err(ChatError::RateLimited),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user.id, "Rate limiter unavailable");
                if !self.fail_open {
                    return Err(ChatError::RateLimited);
                }
                // Fail-open: skip recording too, the backend is down.
                return Ok(());
            }
        }

        if let Err(e) = self.limiter.record_request(&key).await {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to record request");
            if !self.fail_open {
                return Err(ChatError::RateLimited);
            }
        }

        Ok(())
    }
}

/// Per-user admission gate for chat requests.
///
/// Unauthenticated requests pass through untouched; the handler's
/// `RequireAuth` extractor rejects them with 401, which takes precedence
/// over rate limiting.
pub async fn chat_rate_limit(
    State(gate): State<RateLimitGate>,
    request: Request,
    next: Next,
) -> Response {
    let user = request.extensions().get::<AuthenticatedUser>().cloned();

    if let Some(user) = user {
        if let Err(e) = gate.admit(&user).await {
            return e.into_response();
        }
    }

    next.run(request).await
}
