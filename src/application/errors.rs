//! Conversions from port error types into the caller-facing taxonomy.
//!
//! Services use `?` across port boundaries; these impls decide which
//! `ChatError` variant each infrastructure failure surfaces as.

use crate::domain::foundation::ChatError;
use crate::ports::{CacheError, CompletionError, RateLimitError, StoreError};

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource } => ChatError::NotFound { resource },
            StoreError::Duplicate { resource } => {
                ChatError::internal(format!("{} already exists", resource))
            }
            StoreError::Database(message) => ChatError::internal(message),
        }
    }
}

impl From<CompletionError> for ChatError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Upstream {
                status,
                message,
                endpoint,
            } => ChatError::upstream(status, message, endpoint),
            CompletionError::Network(message) => ChatError::upstream(502, message, "upstream"),
            CompletionError::Parse(message) => ChatError::internal(message),
        }
    }
}

impl From<RateLimitError> for ChatError {
    fn from(err: RateLimitError) -> Self {
        let RateLimitError::Unavailable(message) = err;
        ChatError::internal(message)
    }
}

impl From<CacheError> for ChatError {
    fn from(err: CacheError) -> Self {
        let CacheError::Unavailable(message) = err;
        ChatError::internal(message)
    }
}
