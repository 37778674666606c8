//! Redis-backed issued-token presence cache.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::{token_key, CacheError, TokenCache, TOKEN_CACHE_VALUE};

/// Redis-backed token cache.
///
/// Entries self-expire with the token's validity period, so the cache never
/// outlives the credential it mirrors.
#[derive(Clone)]
pub struct RedisTokenCache {
    conn: MultiplexedConnection,
}

impl RedisTokenCache {
    /// Create a new Redis token cache.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TokenCache for RedisTokenCache {
    async fn store(&self, token: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(token_key(token), TOKEN_CACHE_VALUE, ttl_secs)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();

        conn.exists(token_key(token))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))
    }

    async fn remove(&self, token: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(token_key(token))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

impl std::fmt::Debug for RedisTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTokenCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    // Note: Redis integration tests require a running Redis instance
    // and are typically run separately from unit tests. The in-memory
    // cache covers the contract.
}
