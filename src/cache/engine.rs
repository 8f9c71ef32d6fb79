//! Cache Engine Module
//!
//! get/set/delete, tag invalidation, cleanup, expiry reporting and warmup on
//! top of a primitive key-value store.
//!
//! The store's own TTL for a value is its fresh window plus the stale grace
//! window, so the store never drops a value the engine would still serve.
//! The engine decides fresh, stale or expired from the metadata record.
//!
//! There is no per-key locking. Concurrent writers to one key resolve by
//! last write wins, separately for the value and for its metadata.

use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};

use crate::cache::codec;
use crate::cache::entry::{current_timestamp_ms, CacheEntryMetadata, Freshness};
use crate::cache::metadata::MetadataStore;
use crate::cache::stats::{ExpiringKey, KeyAccess, StatsTracker};
use crate::cache::strategy::CacheStrategy;
use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE, RESERVED_PREFIX};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::kv::KeyValueStore;

// == Warmup Entry ==
/// One value to pre-populate.
#[derive(Debug, Clone)]
pub struct WarmupEntry<T> {
    pub key: String,
    pub value: T,
    pub strategy: CacheStrategy,
}

impl<T> WarmupEntry<T> {
    pub fn new(key: impl Into<String>, value: T, strategy: CacheStrategy) -> Self {
        Self {
            key: key.into(),
            value,
            strategy,
        }
    }
}

// == Cache Engine ==
pub struct CacheEngine {
    store: Arc<dyn KeyValueStore>,
    metadata: MetadataStore,
    stats: StatsTracker,
}

impl CacheEngine {
    // == Constructor ==
    /// Creates an engine with default settings.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, &Config::default())
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self {
            metadata: MetadataStore::new(store.clone(), config.metadata_ttl_margin),
            stats: StatsTracker::new(store.clone(), config.stats_ttl),
            store,
        }
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    // == Get ==
    /// Returns the cached value, or `None` on miss. Never fails: store and
    /// decode errors are logged and counted as misses.
    ///
    /// A value past its fresh window but inside its grace window is returned
    /// as a hit without being deleted. Past the grace window the entry is
    /// deleted and the read is a miss.
    pub async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let value = match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        };

        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        self.stats.flush().await;

        value
    }

    async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let (raw, meta) = tokio::try_join!(self.store.get(key), self.metadata.load(key))?;
        let Some(mut meta) = meta else {
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        let freshness = meta.freshness(current_timestamp_ms());
        if freshness == Freshness::Expired {
            debug!(key = %key, "Cache entry past grace window, deleting");
            self.remove_entry(key, Some(&meta)).await?;
            return Ok(None);
        }

        let Some(raw) = raw else {
            debug!(key = %key, "Cache miss, value gone but metadata present");
            return Ok(None);
        };

        let value = codec::decode(&raw)?;
        meta.hit_count += 1;
        if let Err(e) = self.metadata.save(&meta).await {
            warn!(key = %key, error = %e, "Failed to update cache hit count");
        }
        debug!(
            key = %key,
            hits = meta.hit_count,
            stale = freshness == Freshness::Stale,
            "Cache hit"
        );
        Ok(Some(value))
    }

    // == Set ==
    /// Stores `value` under `key` with the lifetime and tags of `strategy`.
    ///
    /// Unlike reads, a failed write is returned to the caller. Value and
    /// metadata are separate writes; if one of them fails the other may
    /// still have landed, and `cleanup` removes the leftover.
    pub async fn set<T: Serialize + ?Sized + Sync>(
        &self,
        key: &str,
        value: &T,
        strategy: &CacheStrategy,
    ) -> Result<()> {
        validate_key(key)?;
        if strategy.ttl_seconds == 0 {
            return Err(CacheError::InvalidRequest(
                "Strategy TTL must be at least 1 second".to_string(),
            ));
        }

        let encoded = codec::encode(value).inspect_err(|e| {
            error!(key = %key, error = %e, "Failed to encode cache value");
        })?;
        let size_bytes = codec::byte_size(&encoded);
        if size_bytes > MAX_VALUE_SIZE as u64 {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let now = current_timestamp_ms();
        let meta = CacheEntryMetadata::new(key, strategy, size_bytes, now);
        let (value_written, meta_written) = tokio::join!(
            self.store.put(key, encoded, Some(meta.hard_ttl_seconds(now))),
            self.metadata.save(&meta)
        );

        if let Err(e) = value_written.and(meta_written) {
            error!(key = %key, error = %e, "Cache write failed");
            return Err(e);
        }

        self.stats.record_set(size_bytes);
        self.stats.flush().await;
        debug!(key = %key, size_bytes, ttl = strategy.ttl_seconds, "Cache set");
        Ok(())
    }

    // == Delete ==
    /// Deletes value and metadata. Deleting a missing key succeeds; `false`
    /// means the store failed.
    pub async fn delete(&self, key: &str) -> bool {
        match self.try_delete(key).await {
            Ok(()) => {
                self.stats.flush().await;
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    async fn try_delete(&self, key: &str) -> Result<()> {
        if key.starts_with(RESERVED_PREFIX) {
            // Nothing is ever cached under a reserved key
            warn!(key = %key, "Ignoring delete of reserved cache key");
            return Ok(());
        }

        let meta = self.metadata.load(key).await;
        // Both deletes run even when the metadata could not be read
        let removed = self
            .remove_entry(key, meta.as_ref().ok().and_then(Option::as_ref))
            .await;
        meta.and(removed)
    }

    /// Deletes value and metadata of `key`, then adjusts the counters by the
    /// recorded size if there was a record. Does not flush stats.
    async fn remove_entry(&self, key: &str, meta: Option<&CacheEntryMetadata>) -> Result<()> {
        let (value_deleted, meta_deleted) =
            tokio::join!(self.store.delete(key), self.metadata.remove(key));
        value_deleted.and(meta_deleted)?;

        if let Some(meta) = meta {
            self.stats.record_delete(meta.size_bytes);
        }
        Ok(())
    }

    // == Invalidate By Tags ==
    /// Deletes every entry carrying at least one of `tags` and returns how
    /// many were deleted.
    ///
    /// Scans every tracked key and loads its metadata; there is no tag index.
    pub async fn invalidate_by_tags<S: AsRef<str> + Sync>(&self, tags: &[S]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let requested: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();

        let keys = match self.metadata.tracked_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(tags = ?requested, error = %e, "Failed to list cache keys for invalidation");
                return 0;
            }
        };

        let outcomes = join_all(
            keys.iter()
                .map(|key| self.invalidate_if_tagged(key, &requested)),
        )
        .await;
        let invalidated = outcomes.into_iter().filter(|deleted| *deleted).count();

        if invalidated > 0 {
            self.stats.flush().await;
        }
        info!(
            tags = ?requested,
            scanned = keys.len(),
            invalidated,
            "Cache invalidated by tags"
        );
        invalidated
    }

    async fn invalidate_if_tagged(&self, key: &str, tags: &[&str]) -> bool {
        match self.metadata.load(key).await {
            Ok(Some(meta)) if meta.has_any_tag(tags) => {
                match self.remove_entry(key, Some(&meta)).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(key = %key, error = %e, "Failed to invalidate cache entry");
                        false
                    }
                }
            }
            Ok(_) => false,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache metadata");
                false
            }
        }
    }

    // == Cleanup ==
    /// Removes entries past their grace window and metadata records whose
    /// value is gone. Returns the number of keys cleaned.
    pub async fn cleanup(&self) -> usize {
        let keys = match self.metadata.tracked_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys for cleanup");
                return 0;
            }
        };

        let now = current_timestamp_ms();
        let outcomes = join_all(keys.iter().map(|key| self.cleanup_key(key, now))).await;
        let cleaned = outcomes.into_iter().filter(|cleaned| *cleaned).count();

        if cleaned > 0 {
            self.stats.flush().await;
            info!(scanned = keys.len(), cleaned, "Cache cleanup finished");
        } else {
            debug!(scanned = keys.len(), "Cache cleanup found nothing to remove");
        }
        cleaned
    }

    async fn cleanup_key(&self, key: &str, now: u64) -> bool {
        let (meta, value) = match tokio::try_join!(self.metadata.load(key), self.store.get(key)) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache entry during cleanup");
                return false;
            }
        };

        let result = match (meta, value) {
            (Some(meta), _) if meta.is_hard_expired(now) => self.remove_entry(key, Some(&meta)).await,
            (Some(_), None) => {
                debug!(key = %key, "Removing orphaned cache metadata");
                self.metadata.remove(key).await
            }
            _ => return false,
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to clean cache entry");
                false
            }
        }
    }

    // == Expiring Keys ==
    /// Entries whose fresh window ends within `within_minutes`, soonest first.
    /// Entries already past their grace window are left out.
    pub async fn get_expiring_keys(&self, within_minutes: u64) -> Vec<ExpiringKey> {
        let now = current_timestamp_ms();
        let horizon = now.saturating_add(within_minutes.saturating_mul(60_000));

        let mut expiring: Vec<ExpiringKey> = self
            .live_metadata(now)
            .await
            .into_iter()
            .filter(|meta| meta.expires_at <= horizon)
            .map(|meta| ExpiringKey {
                ttl_remaining_ms: meta.ttl_remaining_ms(now),
                key: meta.key,
                expires_at: meta.expires_at,
            })
            .collect();

        expiring.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.key.cmp(&b.key)));
        expiring
    }

    // == Most Accessed Keys ==
    /// Up to `limit` live entries with the highest hit counts.
    pub async fn most_accessed_keys(&self, limit: usize) -> Vec<KeyAccess> {
        let mut accessed: Vec<KeyAccess> = self
            .live_metadata(current_timestamp_ms())
            .await
            .into_iter()
            .filter(|meta| meta.hit_count > 0)
            .map(|meta| KeyAccess {
                key: meta.key,
                hit_count: meta.hit_count,
            })
            .collect();

        accessed.sort_by(|a, b| b.hit_count.cmp(&a.hit_count).then_with(|| a.key.cmp(&b.key)));
        accessed.truncate(limit);
        accessed
    }

    /// Metadata of every tracked entry not yet past its grace window.
    async fn live_metadata(&self, now: u64) -> Vec<CacheEntryMetadata> {
        let keys = match self.metadata.tracked_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys");
                return Vec::new();
            }
        };

        join_all(keys.iter().map(|key| self.metadata.load(key)))
            .await
            .into_iter()
            .filter_map(|loaded| loaded.ok().flatten())
            .filter(|meta| !meta.is_hard_expired(now))
            .collect()
    }

    // == Warmup ==
    /// Writes every entry concurrently. Individual failures are logged and
    /// skipped; returns how many entries were stored.
    pub async fn warmup<T: Serialize + Sync>(&self, entries: &[WarmupEntry<T>]) -> usize {
        let results = join_all(entries.iter().map(|entry| async move {
            let result = self.set(&entry.key, &entry.value, &entry.strategy).await;
            (entry.key.as_str(), result)
        }))
        .await;

        let mut warmed = 0;
        for (key, result) in results {
            match result {
                Ok(()) => warmed += 1,
                Err(e) => warn!(key = %key, error = %e, "Cache warmup entry failed"),
            }
        }

        info!(requested = entries.len(), warmed, "Cache warmup finished");
        warmed
    }
}

/// Rejects keys the engine cannot store or that collide with its own records.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if key.starts_with(RESERVED_PREFIX) {
        return Err(CacheError::InvalidRequest(format!(
            "Keys starting with '{}' are reserved",
            RESERVED_PREFIX
        )));
    }
    Ok(())
}
