//! Cache Entry Metadata Module
//!
//! Describes a stored value: lifetime, tags, access count and size.

use serde::{Deserialize, Serialize};

use crate::cache::strategy::{CacheStrategy, Priority, StrategyCatalog};

// == Freshness ==
/// Where an entry sits relative to its expiry and grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// `now <= expires_at`
    Fresh,
    /// Past `expires_at` but inside the stale grace window
    Stale,
    /// Past the grace window; must be deleted
    Expired,
}

// == Cache Entry Metadata ==
/// Metadata record kept alongside every cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntryMetadata {
    pub key: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// End of the fresh window (Unix milliseconds)
    pub expires_at: u64,
    pub tags: Vec<String>,
    pub hit_count: u64,
    /// Encoded value size in bytes
    pub size_bytes: u64,
    pub priority: Priority,
}

impl CacheEntryMetadata {
    // == Constructor ==
    /// Builds the metadata for a value written now under `strategy`.
    pub fn new(key: impl Into<String>, strategy: &CacheStrategy, size_bytes: u64, now: u64) -> Self {
        Self {
            key: key.into(),
            created_at: now,
            expires_at: now.saturating_add(strategy.ttl_seconds.saturating_mul(1000)),
            tags: strategy.tags.iter().map(|t| t.to_string()).collect(),
            hit_count: 0,
            size_bytes,
            priority: strategy.priority,
        }
    }

    /// Grace window resolved from the catalog preset matching this entry's tags.
    pub fn stale_grace_seconds(&self) -> u64 {
        StrategyCatalog::grace_for_tags(&self.tags)
    }

    /// Last instant (Unix milliseconds) at which a stale value may be served.
    pub fn hard_expires_at(&self) -> u64 {
        self.expires_at
            .saturating_add(self.stale_grace_seconds().saturating_mul(1000))
    }

    /// Whole seconds from `now` until the hard expiry point, at least 1.
    /// This is the TTL handed to the store for the value.
    pub fn hard_ttl_seconds(&self, now: u64) -> u64 {
        self.hard_expires_at().saturating_sub(now).div_ceil(1000).max(1)
    }

    // == Freshness ==
    pub fn freshness(&self, now: u64) -> Freshness {
        if now <= self.expires_at {
            Freshness::Fresh
        } else if now <= self.hard_expires_at() {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    pub fn is_hard_expired(&self, now: u64) -> bool {
        self.freshness(now) == Freshness::Expired
    }

    /// True if the entry carries at least one of `tags`.
    pub fn has_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.tags.iter().any(|own| own == t.as_ref()))
    }

    // == Time To Live ==
    /// Remaining fresh time in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
