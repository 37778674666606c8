//! Model catalog with TTL caching and a static fallback.
//!
//! The upstream catalog endpoint is slow and occasionally unavailable, so
//! results are cached for a fixed window. When the upstream cannot be
//! reached at all, a small list of known-good free models is served (and
//! cached for the same window) so clients always get a usable picker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use tokio::sync::RwLock;

use crate::ports::{CompletionClient, ModelInfo, ModelPricing};

/// How long a fetched catalog stays fresh.
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 3600;

/// Cached catalog with expiry tracking.
struct CatalogCache {
    models: Vec<ModelInfo>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CatalogCache {
    fn new(models: Vec<ModelInfo>, ttl: Duration) -> Self {
        Self {
            models,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// Application service exposing the model catalog.
#[derive(Clone)]
pub struct ModelCatalogService {
    completions: Arc<dyn CompletionClient>,
    ttl: Duration,
    cache: Arc<RwLock<Option<CatalogCache>>>,
}

impl ModelCatalogService {
    /// Creates the service with the default cache window.
    pub fn new(completions: Arc<dyn CompletionClient>) -> Self {
        Self::with_ttl(completions, Duration::from_secs(DEFAULT_CATALOG_TTL_SECS))
    }

    /// Creates the service with a custom cache window.
    pub fn with_ttl(completions: Arc<dyn CompletionClient>, ttl: Duration) -> Self {
        Self {
            completions,
            ttl,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns every model the upstream offers.
    ///
    /// Serves from cache while fresh; on upstream failure the static
    /// fallback list is returned and cached like a normal result.
    pub async fn all(&self) -> Vec<ModelInfo> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if !cached.is_expired() {
                    return cached.models.clone();
                }
            }
        }

        // Cache miss or expired - fetch from the upstream
        let models = match self.completions.list_models().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!(error = %e, "Model catalog fetch failed, serving fallback list");
                FALLBACK_MODELS.clone()
            }
        };

        // Update cache
        {
            let mut cache = self.cache.write().await;
            *cache = Some(CatalogCache::new(models.clone(), self.ttl));
        }

        models
    }

    /// Drops the cached catalog; the next read refetches from the upstream.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Returns only the models that cost nothing to use.
    pub async fn free(&self) -> Vec<ModelInfo> {
        self.all()
            .await
            .into_iter()
            .filter(|m| m.is_free())
            .collect()
    }
}

/// Known-good free models served when the upstream catalog is unreachable.
static FALLBACK_MODELS: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    let free_pricing = || ModelPricing {
        prompt: "0".to_string(),
        completion: "0".to_string(),
    };

    vec![
        ModelInfo {
            id: "meta-llama/llama-3.2-3b-instruct:free".to_string(),
            name: "Meta Llama 3.2 3B (Free)".to_string(),
            description: None,
            context_length: None,
            pricing: free_pricing(),
            supports_vision: false,
        },
        ModelInfo {
            id: "amazon/nova-2-lite-v1:free".to_string(),
            name: "Amazon Nova 2 Lite (Free)".to_string(),
            description: None,
            context_length: None,
            pricing: free_pricing(),
            supports_vision: true,
        },
        ModelInfo {
            id: "google/gemma-3-4b-it:free".to_string(),
            name: "Google Gemma 3 4B (Free)".to_string(),
            description: None,
            context_length: None,
            pricing: free_pricing(),
            supports_vision: false,
        },
        ModelInfo {
            id: "openai/gpt-oss-20b:free".to_string(),
            name: "OpenAI GPT-OSS 20B (Free)".to_string(),
            description: None,
            context_length: None,
            pricing: free_pricing(),
            supports_vision: false,
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::ports::{CompletionError, CompletionRequest, CompletionStream};

    struct CountingCatalogClient {
        models: Result<Vec<ModelInfo>, CompletionError>,
        calls: AtomicUsize,
    }

    impl CountingCatalogClient {
        fn returning(models: Vec<ModelInfo>) -> Self {
            Self {
                models: Ok(models),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                models: Err(CompletionError::network("connection refused")),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for CountingCatalogClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            unimplemented!("Not needed for these tests")
        }

        async fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionStream, CompletionError> {
            unimplemented!("Not needed for these tests")
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.models.clone()
        }
    }

    fn paid_model(id: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            context_length: Some(128_000),
            pricing: ModelPricing {
                prompt: "0.000002".to_string(),
                completion: "0.000008".to_string(),
            },
            supports_vision: false,
        }
    }

    fn free_model(id: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            context_length: Some(8192),
            pricing: ModelPricing {
                prompt: "0".to_string(),
                completion: "0".to_string(),
            },
            supports_vision: false,
        }
    }

    #[tokio::test]
    async fn serves_the_upstream_catalog() {
        let client = Arc::new(CountingCatalogClient::returning(vec![
            paid_model("a/one"),
            free_model("b/two:free"),
        ]));
        let service = ModelCatalogService::new(client);

        let models = service.all().await;
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "a/one");
    }

    #[tokio::test]
    async fn caches_the_catalog_within_the_ttl() {
        let client = Arc::new(CountingCatalogClient::returning(vec![free_model(
            "b/two:free",
        )]));
        let service = ModelCatalogService::new(client.clone());

        service.all().await;
        service.all().await;

        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let client = Arc::new(CountingCatalogClient::returning(vec![free_model(
            "b/two:free",
        )]));
        let service = ModelCatalogService::new(client.clone());

        service.all().await;
        service.invalidate().await;
        service.all().await;

        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn refetches_after_the_ttl_expires() {
        let client = Arc::new(CountingCatalogClient::returning(vec![free_model(
            "b/two:free",
        )]));
        let service = ModelCatalogService::with_ttl(client.clone(), Duration::from_millis(1));

        service.all().await;
        std::thread::sleep(Duration::from_millis(10));
        service.all().await;

        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn serves_the_fallback_list_when_upstream_fails() {
        let client = Arc::new(CountingCatalogClient::failing());
        let service = ModelCatalogService::new(client);

        let models = service.all().await;

        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "meta-llama/llama-3.2-3b-instruct:free",
                "amazon/nova-2-lite-v1:free",
                "google/gemma-3-4b-it:free",
                "openai/gpt-oss-20b:free",
            ]
        );
        assert!(models.iter().all(|m| m.is_free()));
    }

    #[tokio::test]
    async fn fallback_vision_support_is_per_model() {
        let client = Arc::new(CountingCatalogClient::failing());
        let service = ModelCatalogService::new(client);

        let models = service.all().await;
        let vision: Vec<bool> = models.iter().map(|m| m.supports_vision).collect();
        assert_eq!(vision, vec![false, true, false, false]);
    }

    #[tokio::test]
    async fn fallback_is_cached_like_a_normal_result() {
        let client = Arc::new(CountingCatalogClient::failing());
        let service = ModelCatalogService::new(client.clone());

        service.all().await;
        service.all().await;

        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn free_filters_out_paid_models() {
        let client = Arc::new(CountingCatalogClient::returning(vec![
            paid_model("a/one"),
            free_model("b/two:free"),
            paid_model("c/three"),
        ]));
        let service = ModelCatalogService::new(client);

        let free = service.free().await;
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id, "b/two:free");
    }

    mod cache_expiry {
        use super::*;

        #[test]
        fn not_expired_initially() {
            let cache = CatalogCache::new(vec![], Duration::from_secs(3600));
            assert!(!cache.is_expired());
        }

        #[test]
        fn expires_after_duration() {
            let cache = CatalogCache::new(vec![], Duration::from_millis(1));
            std::thread::sleep(Duration::from_millis(10));
            assert!(cache.is_expired());
        }
    }
}
