//! In-memory sliding-window rate limiter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{RateLimitError, RateLimitKey, RateLimiter};

/// In-memory rate limiter for tests and single-process runs.
///
/// Same sliding-window semantics as the Redis implementation: a request
/// is admitted while strictly fewer than `limit` requests were recorded
/// in the trailing `window_secs` seconds.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    limit: u64,
    window_secs: u64,
    windows: Arc<RwLock<HashMap<String, Vec<Timestamp>>>>,
    /// When set, both operations report the backend as unavailable.
    unavailable: AtomicBool,
}

impl InMemoryRateLimiter {
    pub fn new(limit: u64, window_secs: u64) -> Self {
        Self {
            limit,
            window_secs,
            windows: Arc::new(RwLock::new(HashMap::new())),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate backend outage, for exercising fail-open behavior.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RateLimitError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RateLimitError::unavailable("simulated outage"));
        }
        Ok(())
    }

    /// Requests recorded at or after the cutoff still count.
    fn window_start(&self) -> Timestamp {
        Timestamp::now().minus_secs(self.window_secs)
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn is_allowed(&self, key: &RateLimitKey) -> Result<bool, RateLimitError> {
        self.check_available()?;
        let cutoff = self.window_start();
        let windows = self.windows.read().await;
        let in_window = windows
            .get(&key.to_store_key())
            .map(|entries| entries.iter().filter(|t| !t.is_before(&cutoff)).count() as u64)
            .unwrap_or(0);
        Ok(in_window < self.limit)
    }

    async fn record_request(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        self.check_available()?;
        let cutoff = self.window_start();
        let mut windows = self.windows.write().await;
        let entries = windows.entry(key.to_store_key()).or_default();
        entries.retain(|t| !t.is_before(&cutoff));
        entries.push(Timestamp::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[tokio::test]
    async fn allows_under_limit() {
        let limiter = InMemoryRateLimiter::new(3, 60);
        let key = RateLimitKey::chat(UserId::new());

        for _ in 0..2 {
            limiter.record_request(&key).await.unwrap();
        }
        assert!(limiter.is_allowed(&key).await.unwrap());
    }

    #[tokio::test]
    async fn denies_at_limit() {
        let limiter = InMemoryRateLimiter::new(3, 60);
        let key = RateLimitKey::chat(UserId::new());

        for _ in 0..3 {
            limiter.record_request(&key).await.unwrap();
        }
        assert!(!limiter.is_allowed(&key).await.unwrap());
    }

    #[tokio::test]
    async fn users_limited_independently() {
        let limiter = InMemoryRateLimiter::new(1, 60);
        let first = RateLimitKey::chat(UserId::new());
        let second = RateLimitKey::chat(UserId::new());

        limiter.record_request(&first).await.unwrap();

        assert!(!limiter.is_allowed(&first).await.unwrap());
        assert!(limiter.is_allowed(&second).await.unwrap());
    }

    #[tokio::test]
    async fn requests_outside_window_do_not_count() {
        let limiter = InMemoryRateLimiter::new(1, 60);
        let key = RateLimitKey::chat(UserId::new());

        // Plant a request well outside the window.
        {
            let mut windows = limiter.windows.write().await;
            windows.insert(
                key.to_store_key(),
                vec![Timestamp::now().minus_secs(61)],
            );
        }

        assert!(limiter.is_allowed(&key).await.unwrap());
    }

    #[tokio::test]
    async fn recording_prunes_expired_entries() {
        let limiter = InMemoryRateLimiter::new(10, 60);
        let key = RateLimitKey::chat(UserId::new());

        {
            let mut windows = limiter.windows.write().await;
            windows.insert(
                key.to_store_key(),
                vec![Timestamp::now().minus_secs(120), Timestamp::now().minus_secs(90)],
            );
        }

        limiter.record_request(&key).await.unwrap();

        let windows = limiter.windows.read().await;
        assert_eq!(windows.get(&key.to_store_key()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_backend_surfaces_error() {
        let limiter = InMemoryRateLimiter::new(3, 60);
        let key = RateLimitKey::chat(UserId::new());
        limiter.set_unavailable(true);

        assert!(limiter.is_allowed(&key).await.is_err());
        assert!(limiter.record_request(&key).await.is_err());

        limiter.set_unavailable(false);
        assert!(limiter.is_allowed(&key).await.is_ok());
    }

    mod window_properties {
        use super::*;
        use proptest::prelude::*;

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime")
        }

        proptest! {
            /// Admission is the in-window count compared against the
            /// limit, nothing else.
            #[test]
            fn admission_mirrors_the_window_count(
                recorded in 0u64..40,
                limit in 1u64..40,
            ) {
                let allowed = runtime().block_on(async {
                    let limiter = InMemoryRateLimiter::new(limit, 60);
                    let key = RateLimitKey::chat(UserId::new());
                    for _ in 0..recorded {
                        limiter.record_request(&key).await.unwrap();
                    }
                    limiter.is_allowed(&key).await.unwrap()
                });

                prop_assert_eq!(allowed, recorded < limit);
            }

            /// Entries older than the window never count. Ages skip the
            /// exact boundary, where the verdict depends on how much time
            /// passes between planting and checking.
            #[test]
            fn only_entries_inside_the_window_count(
                ages in proptest::collection::vec(
                    prop_oneof![0u64..=3_599, 3_601u64..=7_200],
                    0..10,
                ),
                limit in 1u64..10,
            ) {
                let window_secs = 3_600;
                let in_window = ages.iter().filter(|age| **age < window_secs).count() as u64;

                let allowed = runtime().block_on(async {
                    let limiter = InMemoryRateLimiter::new(limit, window_secs);
                    let key = RateLimitKey::chat(UserId::new());
                    {
                        let mut windows = limiter.windows.write().await;
                        windows.insert(
                            key.to_store_key(),
                            ages.iter()
                                .map(|age| Timestamp::now().minus_secs(*age))
                                .collect(),
                        );
                    }
                    limiter.is_allowed(&key).await.unwrap()
                });

                prop_assert_eq!(allowed, in_window < limit);
            }
        }
    }
}
