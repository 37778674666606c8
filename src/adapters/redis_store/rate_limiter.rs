//! Redis-backed sliding-window rate limiter.
//!
//! Each user/resource pair owns a sorted set. Members are scored by their
//! request's epoch second; admission counts the members inside the trailing
//! window. Member strings carry a nanosecond component so two requests in
//! the same second stay distinct entries.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::Timestamp;
use crate::ports::{RateLimitError, RateLimitKey, RateLimiter};

/// Extra retention past the window so a set lingers long enough to be
/// counted by late checks before Redis reclaims it.
const EXPIRE_GRACE_SECS: u64 = 10;

/// Redis-backed rate limiter for multi-server deployments.
///
/// Check and record are separate round trips; concurrent handlers for the
/// same user can overshoot the limit by at most the number of in-flight
/// requests, which the admission policy accepts.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    limit: u64,
    window_secs: u64,
}

impl RedisRateLimiter {
    /// Create a new Redis rate limiter.
    pub fn new(conn: MultiplexedConnection, limit: u64, window_secs: u64) -> Self {
        Self {
            conn,
            limit,
            window_secs,
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn is_allowed(&self, key: &RateLimitKey) -> Result<bool, RateLimitError> {
        let store_key = key.to_store_key();
        let now = Timestamp::now().as_unix_secs();
        let window_start = now.saturating_sub(self.window_secs);

        let mut conn = self.conn.clone();

        let count: u64 = conn
            .zcount(&store_key, window_start, now)
            .await
            .map_err(|e: redis::RedisError| RateLimitError::Unavailable(e.to_string()))?;

        Ok(count < self.limit)
    }

    async fn record_request(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        let store_key = key.to_store_key();
        let now = Timestamp::now().as_unix_secs();
        let member = window_member(now);

        let mut conn = self.conn.clone();

        conn.zadd::<_, _, _, ()>(&store_key, member, now)
            .await
            .map_err(|e: redis::RedisError| RateLimitError::Unavailable(e.to_string()))?;

        conn.expire::<_, ()>(&store_key, (self.window_secs + EXPIRE_GRACE_SECS) as i64)
            .await
            .map_err(|e: redis::RedisError| RateLimitError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("limit", &self.limit)
            .field("window_secs", &self.window_secs)
            .finish_non_exhaustive()
    }
}

/// Builds the sorted-set member for a request at `now_secs`.
fn window_member(now_secs: u64) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{}:{}", now_secs, nanos)
}
