//! In-memory response cache for weather API calls.

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::{future::Future, sync::Arc, time::Duration};

use crate::error::DashboardError;

const MAX_ENTRIES: u64 = 256;

/// A JSON document as returned by the API, with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedResponse {
    pub body: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body, fetched_at: Utc::now() }
    }
}

/// Time-boxed cache keyed by the full request signature.
///
/// Loads for the same key are coalesced: while one is in flight, other callers
/// wait for its result instead of issuing their own request. Failed loads are
/// not stored.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, Arc<CachedResponse>>,
    ttl: Duration,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(MAX_ENTRIES).time_to_live(ttl).build();
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Arc<CachedResponse>> {
        self.cache.get(key).await
    }

    /// Return the cached entry for `key` or run `fetch` to fill it.
    pub async fn get_or_fetch<F>(
        &self,
        key: String,
        fetch: F,
    ) -> Result<Arc<CachedResponse>, DashboardError>
    where
        F: Future<Output = Result<CachedResponse, DashboardError>>,
    {
        self.cache
            .try_get_with(key, async move { fetch.await.map(Arc::new) })
            .await
            .map_err(|err: Arc<DashboardError>| (*err).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let cache = ResponseCache::new(Duration::from_secs(3600));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let entry = cache
                .get_or_fetch("k".to_string(), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(CachedResponse::new(json!({ "n": 1 })))
                })
                .await
                .unwrap();
            assert_eq!(entry.body, json!({ "n": 1 }));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get("k").await.is_some());
        assert!(cache.get("other").await.is_none());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = ResponseCache::new(Duration::from_secs(3600));

        let err = cache
            .get_or_fetch("k".to_string(), async {
                Err(DashboardError::Http { status: 500, body: "boom".into() })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Http { status: 500, .. }));

        let entry = cache
            .get_or_fetch("k".to_string(), async { Ok(CachedResponse::new(json!(1))) })
            .await
            .unwrap();
        assert_eq!(entry.body, json!(1));
    }

    #[tokio::test]
    async fn concurrent_loads_for_one_key_are_coalesced() {
        let cache = ResponseCache::new(Duration::from_secs(3600));
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |cache: ResponseCache, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_fetch("same".to_string(), async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(CachedResponse::new(json!("v")))
                })
                .await
        };

        let (a, b) = tokio::join!(
            load(cache.clone(), calls.clone()),
            load(cache.clone(), calls.clone())
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
