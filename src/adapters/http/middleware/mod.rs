//! HTTP middleware for axum.
//!
//! Cross-cutting concerns applied around handlers:
//!
//! - `auth` - Bearer token validation and the `RequireAuth` extractor
//! - `rate_limit` - per-user admission gate for the chat endpoints

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthRejection, BearerToken, RequireAuth};
pub use rate_limit::{chat_rate_limit, RateLimitGate};
