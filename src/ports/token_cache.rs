//! Token cache port.
//!
//! Presence cache for issued credentials. An entry is written when a token
//! is issued and removed on logout, so presence is required (but not
//! sufficient) for a token to be treated as valid. Entries are keyed by a
//! content hash of the token, never the raw credential, and expire with the
//! token's own validity period.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Sentinel value stored for each cached token.
pub const TOKEN_CACHE_VALUE: &str = "valid";

/// Port for the issued-token presence cache.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Record a token as issued, expiring after `ttl_secs`.
    async fn store(&self, token: &str, ttl_secs: u64) -> Result<(), CacheError>;

    /// Returns true if the token is present (issued and not revoked).
    async fn contains(&self, token: &str) -> Result<bool, CacheError>;

    /// Remove a token (revocation on logout).
    async fn remove(&self, token: &str) -> Result<(), CacheError>;
}

/// Returns the cache key for a token: `token:` plus its SHA-256 hex digest.
///
/// All implementations key by this function so the raw credential never
/// reaches the store.
pub fn token_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("token:{:x}", digest)
}

/// Errors from the token cache.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Cache backend is unavailable.
    #[error("token cache unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
