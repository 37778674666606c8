//! The error vocabulary shared by every layer.

use thiserror::Error;

/// A field that failed construction or request validation.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// A required field was empty or all whitespace.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// A numeric field fell outside its allowed bounds.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// A field was present but malformed, with the reason spelled out.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Caller-facing error taxonomy.
///
/// Every failure that reaches a request boundary maps onto one of these
/// variants. Resolution-phase failures become HTTP error responses;
/// mid-stream failures become in-band `error` events.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// Referenced resource absent, or not owned by the caller.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Credential invalid, expired, or revoked.
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Admission window exceeded.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Upstream completion call failed.
    #[error("Upstream error ({status}) from {endpoint}: {detail}")]
    Upstream {
        status: u16,
        detail: String,
        endpoint: String,
    },

    /// Malformed request.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Anything else. Never carries internals to the caller verbatim.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ChatError {
    /// Creates a not-found error for a named resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        ChatError::NotFound { resource: resource.into() }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        ChatError::Unauthorized { reason: reason.into() }
    }

    /// Creates an upstream error with HTTP status and target endpoint.
    pub fn upstream(status: u16, detail: impl Into<String>, endpoint: impl Into<String>) -> Self {
        ChatError::Upstream {
            status,
            detail: detail.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ChatError::Internal { message: message.into() }
    }

    /// Stable machine-readable code for HTTP error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::NotFound { .. } => "NOT_FOUND",
            ChatError::Unauthorized { .. } => "UNAUTHORIZED",
            ChatError::RateLimited => "RATE_LIMITED",
            ChatError::Upstream { .. } => "UPSTREAM_ERROR",
            ChatError::Validation(_) => "VALIDATION_ERROR",
            ChatError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_the_field() {
        assert_eq!(
            ValidationError::empty_field("message").to_string(),
            "Field 'message' cannot be empty"
        );
        assert_eq!(
            ValidationError::invalid_format("role", "unknown role 'system'").to_string(),
            "Field 'role' has invalid format: unknown role 'system'"
        );
    }

    #[test]
    fn validation_display_spells_out_the_bounds() {
        assert_eq!(
            ValidationError::out_of_range("password", 8, 72, 4).to_string(),
            "Field 'password' must be between 8 and 72, got 4"
        );
    }

    #[test]
    fn chat_error_not_found_displays_resource() {
        let err = ChatError::not_found("Conversation");
        assert_eq!(format!("{}", err), "Conversation not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn chat_error_rate_limited_has_fixed_message() {
        let err = ChatError::RateLimited;
        assert_eq!(
            format!("{}", err),
            "Rate limit exceeded. Please try again later."
        );
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[test]
    fn chat_error_upstream_carries_status_and_endpoint() {
        let err = ChatError::upstream(502, "bad gateway", "/chat/completions");
        match &err {
            ChatError::Upstream { status, endpoint, .. } => {
                assert_eq!(*status, 502);
                assert_eq!(endpoint, "/chat/completions");
            }
            _ => panic!("Expected Upstream variant"),
        }
        assert_eq!(err.code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn chat_error_wraps_validation_error() {
        let err: ChatError = ValidationError::empty_field("message").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
