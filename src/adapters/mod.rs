//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application core to external systems:
//! - `http` - REST and SSE surface (axum)
//! - `postgres` - Conversation and user persistence (sqlx)
//! - `redis_store` - Rate-limit windows and token cache (redis)
//! - `openrouter` - Upstream completion API client (reqwest)
//! - `memory` - In-memory implementations for tests

pub mod http;
pub mod memory;
pub mod openrouter;
pub mod postgres;
pub mod redis_store;
