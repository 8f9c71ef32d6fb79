//! Failure-injecting store wrapper used by tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::kv::{KeyValueStore, MemoryStore};

/// Wraps a [`MemoryStore`] and fails selected operations.
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    failing_puts: HashSet<String>,
    offline: AtomicBool,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fails every `put` whose key is exactly `key`.
    pub(crate) fn fail_puts_for(mut self, key: &str) -> Self {
        self.failing_puts.insert(key.to_string());
        self
    }

    /// Makes every operation fail until switched back.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CacheError::Store("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()> {
        self.check()?;
        if self.failing_puts.contains(key) {
            return Err(CacheError::Store(format!("put rejected for {}", key)));
        }
        self.inner.put(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        self.check()?;
        self.inner.list(prefix).await
    }
}
