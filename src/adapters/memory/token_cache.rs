//! In-memory token cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{token_key, CacheError, TokenCache};

/// In-memory token cache for tests and single-process runs.
///
/// Entries carry an expiry computed at store time; expired entries are
/// treated as absent on read.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenCache {
    entries: Arc<RwLock<HashMap<String, Timestamp>>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, for test assertions.
    pub async fn len(&self) -> usize {
        let now = Timestamp::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|expiry| now.is_before(expiry))
            .count()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn store(&self, token: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let expiry = Timestamp::now().plus_secs(ttl_secs);
        self.entries.write().await.insert(token_key(token), expiry);
        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&token_key(token))
            .is_some_and(|expiry| Timestamp::now().is_before(expiry)))
    }

    async fn remove(&self, token: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(&token_key(token));
        Ok(())
    }
}
