//! In-memory adapter implementations.
//!
//! Backed by `HashMap`s behind async locks. Used by tests and available
//! for single-process development runs without Postgres or Redis.

mod completion_client;
mod conversation_store;
mod rate_limiter;
mod token_cache;
mod user_store;

pub use completion_client::{free_model, MockCompletionClient};
pub use conversation_store::InMemoryConversationStore;
pub use rate_limiter::InMemoryRateLimiter;
pub use token_cache::InMemoryTokenCache;
pub use user_store::InMemoryUserStore;
