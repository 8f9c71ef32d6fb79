//! Cache Service Module
//!
//! Facade used by HTTP middleware, admin endpoints and monitoring.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::cache::engine::{CacheEngine, WarmupEntry};
use crate::cache::stats::{CacheStats, ExpiringKey};
use crate::cache::strategy::CacheStrategy;
use crate::config::Config;
use crate::error::Result;
use crate::kv::KeyValueStore;

// == Cache Status ==
/// Whether a response was served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header.
    pub fn header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

// == Cache Service ==
pub struct CacheService {
    engine: CacheEngine,
    expiring_window_minutes: u64,
    most_accessed_limit: usize,
}

impl CacheService {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self {
            engine: CacheEngine::with_config(store, config),
            expiring_window_minutes: config.expiring_window_minutes,
            most_accessed_limit: config.most_accessed_limit,
        }
    }

    pub fn engine(&self) -> &CacheEngine {
        &self.engine
    }

    pub async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        self.engine.get(key).await
    }

    pub async fn set<T: Serialize + ?Sized + Sync>(
        &self,
        key: &str,
        value: &T,
        strategy: &CacheStrategy,
    ) -> Result<()> {
        self.engine.set(key, value, strategy).await
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.engine.delete(key).await
    }

    pub async fn invalidate_by_tags<S: AsRef<str> + Sync>(&self, tags: &[S]) -> usize {
        self.engine.invalidate_by_tags(tags).await
    }

    pub async fn cleanup(&self) -> usize {
        self.engine.cleanup().await
    }

    pub async fn get_expiring_keys(&self, within_minutes: u64) -> Vec<ExpiringKey> {
        self.engine.get_expiring_keys(within_minutes).await
    }

    pub async fn warmup<T: Serialize + Sync>(&self, entries: &[WarmupEntry<T>]) -> usize {
        self.engine.warmup(entries).await
    }

    // == Stats ==
    /// Persisted counters plus the most accessed and soon-expiring keys.
    pub async fn get_stats(&self) -> CacheStats {
        let (mut stats, most_accessed, expiring) = tokio::join!(
            self.engine.stats().snapshot(),
            self.engine.most_accessed_keys(self.most_accessed_limit),
            self.engine.get_expiring_keys(self.expiring_window_minutes)
        );
        stats.most_accessed_keys = most_accessed;
        stats.expiring_keys = expiring;
        stats
    }

    pub async fn reset_stats(&self) -> Result<()> {
        self.engine.stats().reset().await
    }

    // == Get Or Compute ==
    /// Cache-aside read: returns the cached value, or computes, stores and
    /// returns it. A failed store write is logged and the computed value is
    /// still returned; only errors from `compute` propagate.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &str,
        strategy: &CacheStrategy,
        compute: F,
    ) -> Result<(T, CacheStatus)>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.engine.get(key).await {
            return Ok((cached, CacheStatus::Hit));
        }

        let value = compute().await?;
        if let Err(e) = self.engine.set(key, &value, strategy).await {
            warn!(key = %key, error = %e, "Serving uncached value after cache write failure");
        }
        Ok((value, CacheStatus::Miss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::menu_key;
    use crate::cache::strategy::{Priority, MENU_STRATEGY};
    use crate::error::CacheError;
    use crate::kv::flaky::FlakyStore;
    use crate::kv::MemoryStore;

    fn service() -> CacheService {
        CacheService::new(Arc::new(MemoryStore::new()), &Config::default())
    }

    #[tokio::test]
    async fn test_get_or_compute_hit_and_miss() {
        let service = service();
        let key = menu_key(1);

        let (value, status) = service
            .get_or_compute(&key, &MENU_STRATEGY, || async { Ok(vec!["tea".to_string()]) })
            .await
            .unwrap();
        assert_eq!(value, vec!["tea".to_string()]);
        assert_eq!(status, CacheStatus::Miss);

        let (value, status) = service
            .get_or_compute(&key, &MENU_STRATEGY, || async {
                Err::<Vec<String>, _>(CacheError::Internal("should not run".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(value, vec!["tea".to_string()]);
        assert_eq!(status, CacheStatus::Hit);
    }

    #[tokio::test]
    async fn test_get_or_compute_survives_write_failure() {
        let kv = Arc::new(FlakyStore::new().fail_puts_for("menu:2"));
        let service = CacheService::new(kv, &Config::default());

        let (value, status) = service
            .get_or_compute("menu:2", &MENU_STRATEGY, || async { Ok(42u32) })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(status, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn test_get_or_compute_propagates_compute_error() {
        let service = service();
        let result = service
            .get_or_compute::<u32, _, _>("k", &MENU_STRATEGY, || async {
                Err(CacheError::Internal("db down".to_string()))
            })
            .await;
        assert!(matches!(result, Err(CacheError::Internal(_))));
    }

    #[tokio::test]
    async fn test_get_stats_enriched() {
        let service = service();
        const SHORT: CacheStrategy = CacheStrategy::new(60, &["t"], Priority::Low, 0);
        service.set("hot", "v", &SHORT).await.unwrap();
        service.get::<String>("hot").await;
        service.get::<String>("missing").await;

        let stats = service.get_stats().await;
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.total_keys, 1);
        assert_eq!(stats.average_hit_rate, 0.5);
        assert_eq!(stats.most_accessed_keys[0].key, "hot");
        assert_eq!(stats.expiring_keys[0].key, "hot");
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let service = service();
        service.get::<String>("missing").await;
        service.reset_stats().await.unwrap();

        let stats = service.get_stats().await;
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.average_hit_rate, 0.0);
    }

    #[test]
    fn test_header_values() {
        assert_eq!(CacheStatus::Hit.header_value(), "HIT");
        assert_eq!(CacheStatus::Miss.header_value(), "MISS");
    }
}
