//! In-Memory Store Module
//!
//! HashMap-backed key-value store that enforces per-key TTL on its own,
//! the way a hosted KV provider would.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::current_timestamp_ms;
use crate::error::Result;
use crate::kv::KeyValueStore;

// == Stored Value ==
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl StoredValue {
    fn is_expired(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

// == Memory Store ==
/// Thread-safe in-process key-value store with provider-side expiry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|v| !v.is_expired(now))
            .map(|v| v.value.clone()))
    }

    async fn put(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()> {
        let expires_at =
            ttl_seconds.map(|ttl| current_timestamp_ms().saturating_add(ttl.saturating_mul(1000)));
        self.entries
            .write()
            .await
            .insert(key.to_string(), StoredValue { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;

        // Listing doubles as the store's own expiry sweep
        entries.retain(|_, v| !v.is_expired(now));

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| prefix.map_or(true, |p| k.starts_with(p)))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
