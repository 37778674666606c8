//! Rate limiting port - sliding-window admission control.
//!
//! The limiter answers one question (is this caller inside its window
//! budget?) and records one fact (a request happened now). Check and record
//! are deliberately separate calls; they are not atomic with respect to
//! other handlers for the same user, and a small bounded overshoot under
//! race is accepted.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

/// Port for sliding-window rate limiting.
///
/// Implementations must be safe under concurrent access from many request
/// handlers sharing one counter store. Errors are reported honestly;
/// whether a failed check admits or rejects the request is the caller's
/// policy decision, not the limiter's.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Returns true if the key has admission capacity left in its window.
    ///
    /// Counts entries recorded within the trailing window ending now;
    /// allowed iff that count is below the configured limit.
    async fn is_allowed(&self, key: &RateLimitKey) -> Result<bool, RateLimitError>;

    /// Records one request at the current instant.
    ///
    /// Two requests in the same second must both be recorded. Refreshes the
    /// retention of the key so idle windows are reclaimed.
    async fn record_request(&self, key: &RateLimitKey) -> Result<(), RateLimitError>;
}

/// Key identifying one user's window for one limited resource.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    /// The user whose window this is.
    pub user_id: UserId,
    /// The limited resource, e.g. `"chat"`.
    pub resource: String,
}

impl RateLimitKey {
    /// Creates a key for the chat resource.
    pub fn chat(user_id: UserId) -> Self {
        Self {
            user_id,
            resource: "chat".to_string(),
        }
    }

    /// Creates a key for an arbitrary resource.
    pub fn resource(user_id: UserId, resource: impl Into<String>) -> Self {
        Self {
            user_id,
            resource: resource.into(),
        }
    }

    /// Returns the counter-store key string for this window.
    pub fn to_store_key(&self) -> String {
        format!("rate_limit:user:{}:{}", self.user_id, self.resource)
    }
}

/// Why an admission check could not be answered.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RateLimitError {
    /// The counter store could not be reached or refused the operation.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}

impl RateLimitError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
