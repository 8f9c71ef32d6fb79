//! Cache Statistics Module
//!
//! Tracks hits, misses, key count and size. Counters are per-process atomics
//! flushed to the store after each mutation; when several instances share a
//! store the last flush wins, so totals are advisory rather than exact.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::STATS_KEY;
use crate::error::Result;
use crate::kv::KeyValueStore;

// == Stats Counters ==
/// Raw counters; the only part of the statistics that is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsCounters {
    pub total_keys: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub total_size_bytes: u64,
}

impl StatsCounters {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// A key and how often it has been read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAccess {
    pub key: String,
    pub hit_count: u64,
}

/// A key and the end of its fresh window (Unix milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringKey {
    pub key: String,
    pub expires_at: u64,
    /// Fresh time left when the list was built
    pub ttl_remaining_ms: u64,
}

// == Cache Stats ==
/// Aggregate view handed to monitoring and admin callers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub total_keys: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub total_size_bytes: u64,
    /// Always recomputed from the hit/miss counters
    pub average_hit_rate: f64,
    pub most_accessed_keys: Vec<KeyAccess>,
    pub expiring_keys: Vec<ExpiringKey>,
}

impl From<StatsCounters> for CacheStats {
    fn from(counters: StatsCounters) -> Self {
        Self {
            total_keys: counters.total_keys,
            hit_count: counters.hit_count,
            miss_count: counters.miss_count,
            total_size_bytes: counters.total_size_bytes,
            average_hit_rate: counters.hit_rate(),
            most_accessed_keys: Vec::new(),
            expiring_keys: Vec::new(),
        }
    }
}

// == Stats Tracker ==
pub struct StatsTracker {
    store: Arc<dyn KeyValueStore>,
    /// TTL of the persisted snapshot, so it vanishes if never refreshed
    snapshot_ttl_seconds: u64,
    total_keys: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    total_size_bytes: AtomicU64,
}

impl StatsTracker {
    // == Constructor ==
    /// Creates a tracker with all counters at zero.
    pub fn new(store: Arc<dyn KeyValueStore>, snapshot_ttl_seconds: u64) -> Self {
        Self {
            store,
            snapshot_ttl_seconds,
            total_keys: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            total_size_bytes: AtomicU64::new(0),
        }
    }

    pub fn record_hit(&self) {
        self.hit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Accounts for a successful write of `size_bytes`.
    pub fn record_set(&self, size_bytes: u64) {
        self.total_keys.fetch_add(1, Ordering::Relaxed);
        self.total_size_bytes.fetch_add(size_bytes, Ordering::Relaxed);
    }

    /// Accounts for the removal of an entry of `size_bytes`. Never goes below zero.
    pub fn record_delete(&self, size_bytes: u64) {
        saturating_sub(&self.total_keys, 1);
        saturating_sub(&self.total_size_bytes, size_bytes);
    }

    // == Counters ==
    /// Current in-memory counters of this process.
    pub fn counters(&self) -> StatsCounters {
        StatsCounters {
            total_keys: self.total_keys.load(Ordering::Relaxed),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            total_size_bytes: self.total_size_bytes.load(Ordering::Relaxed),
        }
    }

    // == Persist ==
    /// Writes the current counters under the stats key.
    pub async fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.counters())?;
        self.store
            .put(STATS_KEY, raw, Some(self.snapshot_ttl_seconds))
            .await
    }

    /// Best-effort persist; a failure is only logged.
    pub async fn flush(&self) {
        if let Err(e) = self.persist().await {
            warn!(error = %e, "Failed to persist cache stats");
        }
    }

    /// Reads the persisted counters. Absent or unparsable snapshots yield `None`.
    pub async fn load_persisted(&self) -> Result<Option<StatsCounters>> {
        let Some(raw) = self.store.get(STATS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(counters) => Ok(Some(counters)),
            Err(e) => {
                warn!(error = %e, "Corrupted cache stats snapshot");
                Ok(None)
            }
        }
    }

    // == Snapshot ==
    /// Persisted counters, falling back to this process's counters.
    pub async fn snapshot(&self) -> CacheStats {
        let counters = match self.load_persisted().await {
            Ok(Some(counters)) => counters,
            Ok(None) => {
                debug!("No persisted cache stats, using in-memory counters");
                self.counters()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cache stats, using in-memory counters");
                self.counters()
            }
        };
        CacheStats::from(counters)
    }

    // == Reset ==
    /// Zeroes every counter and persists the empty snapshot.
    pub async fn reset(&self) -> Result<()> {
        self.total_keys.store(0, Ordering::Relaxed);
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
        self.total_size_bytes.store(0, Ordering::Relaxed);
        self.persist().await
    }
}

fn saturating_sub(counter: &AtomicU64, amount: u64) {
    // The closure always returns Some, so the update cannot fail
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_sub(amount))
    });
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::flaky::FlakyStore;
    use crate::kv::MemoryStore;

    fn tracker() -> (Arc<MemoryStore>, StatsTracker) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), StatsTracker::new(kv, 300))
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let counters = StatsCounters::default();
        assert_eq!(counters.hit_rate(), 0.0);
        assert!(!counters.hit_rate().is_nan());
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters {
            hit_count: 3,
            miss_count: 1,
            ..Default::default()
        };
        assert_eq!(counters.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_set_and_delete() {
        let (_, stats) = tracker();
        stats.record_set(100);
        stats.record_set(50);
        stats.record_delete(100);

        let counters = stats.counters();
        assert_eq!(counters.total_keys, 1);
        assert_eq!(counters.total_size_bytes, 50);
    }

    #[test]
    fn test_record_delete_saturates() {
        let (_, stats) = tracker();
        stats.record_delete(10);

        let counters = stats.counters();
        assert_eq!(counters.total_keys, 0);
        assert_eq!(counters.total_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_snapshot_reads_persisted_counters() {
        let (_, stats) = tracker();
        stats.record_hit();
        stats.record_miss();
        stats.flush().await;

        // Unflushed activity is not visible through the snapshot
        stats.record_hit();

        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.hit_count, 1);
        assert_eq!(snapshot.miss_count, 1);
        assert_eq!(snapshot.average_hit_rate, 0.5);
    }

    #[tokio::test]
    async fn test_snapshot_falls_back_to_memory() {
        let (_, stats) = tracker();
        stats.record_hit();

        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.hit_count, 1);
        assert_eq!(snapshot.average_hit_rate, 1.0);
    }

    #[tokio::test]
    async fn test_corrupted_snapshot_falls_back() {
        let (kv, stats) = tracker();
        kv.put(STATS_KEY, "garbage".to_string(), None).await.unwrap();
        stats.record_miss();

        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.miss_count, 1);
    }

    #[tokio::test]
    async fn test_reset_persists_zeroes() {
        let (_, stats) = tracker();
        stats.record_hit();
        stats.record_set(10);
        stats.flush().await;

        stats.reset().await.unwrap();

        assert_eq!(stats.load_persisted().await.unwrap(), Some(StatsCounters::default()));
        assert_eq!(stats.snapshot().await.average_hit_rate, 0.0);
    }

    #[tokio::test]
    async fn test_reset_reports_store_failure() {
        let kv = Arc::new(FlakyStore::new());
        let stats = StatsTracker::new(kv.clone(), 300);
        kv.set_offline(true);

        assert!(stats.reset().await.is_err());
        // Snapshot still answers from memory
        assert_eq!(stats.snapshot().await.hit_count, 0);
    }
}
