//! Metadata Store Module
//!
//! Persists one metadata record per cached key, separately from the value.
//! The two writes are not atomic: a value can exist without metadata and
//! the other way round until `cleanup` reconciles them or the store expires
//! the leftover.

use std::sync::Arc;

use tracing::warn;

use crate::cache::entry::CacheEntryMetadata;
use crate::cache::{current_timestamp_ms, META_PREFIX};
use crate::error::Result;
use crate::kv::KeyValueStore;

// == Metadata Store ==
#[derive(Clone)]
pub struct MetadataStore {
    store: Arc<dyn KeyValueStore>,
    /// Seconds a metadata record outlives the value it describes
    ttl_margin_seconds: u64,
}

impl MetadataStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_margin_seconds: u64) -> Self {
        Self {
            store,
            ttl_margin_seconds,
        }
    }

    /// Store key under which the metadata of `key` lives.
    pub fn record_key(key: &str) -> String {
        format!("{}{}", META_PREFIX, key)
    }

    // == Load ==
    /// Loads the metadata of `key`. A record that fails to parse is treated as absent.
    pub async fn load(&self, key: &str) -> Result<Option<CacheEntryMetadata>> {
        let Some(raw) = self.store.get(&Self::record_key(key)).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupted cache metadata, treating as absent");
                Ok(None)
            }
        }
    }

    // == Save ==
    /// Writes the record with a store TTL reaching past the entry's grace window.
    pub async fn save(&self, meta: &CacheEntryMetadata) -> Result<()> {
        let raw = serde_json::to_string(meta)?;
        let ttl = self.record_ttl_seconds(meta, current_timestamp_ms());
        self.store
            .put(&Self::record_key(&meta.key), raw, Some(ttl))
            .await
    }

    fn record_ttl_seconds(&self, meta: &CacheEntryMetadata, now: u64) -> u64 {
        meta.hard_ttl_seconds(now) + self.ttl_margin_seconds
    }

    // == Remove ==
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.store.delete(&Self::record_key(key)).await
    }

    // == Tracked Keys ==
    /// Every cache key that currently has a metadata record.
    pub async fn tracked_keys(&self) -> Result<Vec<String>> {
        let records = self.store.list(Some(META_PREFIX)).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| record.strip_prefix(META_PREFIX).map(str::to_string))
            .collect())
    }
}
