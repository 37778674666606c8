//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ConversationStore` / `UserStore` - durable persistence
//! - `CompletionClient` - the upstream model provider
//! - `RateLimiter` - sliding-window admission control counters
//! - `TokenCache` - issued-credential presence cache

mod completion_client;
mod conversation_store;
mod rate_limiter;
mod token_cache;
mod user_store;

pub use completion_client::{
    CompletionClient, CompletionError, CompletionRequest, CompletionStream, ModelInfo,
    ModelPricing, IMAGE_DATA_URI_PREFIX,
};
pub use conversation_store::{ConversationStore, Page, PageRequest, StoreError};
pub use rate_limiter::{RateLimitError, RateLimitKey, RateLimiter};
pub use token_cache::{token_key, CacheError, TokenCache, TOKEN_CACHE_VALUE};
pub use user_store::UserStore;
