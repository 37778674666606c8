//! Redis adapters - counters and caches backed by a shared Redis.
//!
//! - `RedisRateLimiter` - sorted-set sliding-window admission counters
//! - `RedisTokenCache` - issued-token presence cache

mod rate_limiter;
mod token_cache;

pub use rate_limiter::RedisRateLimiter;
pub use token_cache::RedisTokenCache;
