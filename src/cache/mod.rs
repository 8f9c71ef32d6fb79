//! Cache Module
//!
//! TTL and tag aware caching over a primitive key-value store.

pub mod codec;
mod engine;
mod entry;
pub mod keys;
mod metadata;
mod service;
mod stats;
mod strategy;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::{CacheEngine, WarmupEntry};
pub use entry::{current_timestamp_ms, CacheEntryMetadata, Freshness};
pub use metadata::MetadataStore;
pub use service::{CacheService, CacheStatus};
pub use stats::{CacheStats, ExpiringKey, KeyAccess, StatsCounters, StatsTracker};
pub use strategy::{
    CacheStrategy, Priority, StrategyCatalog, ANALYTICS_STRATEGY, MENU_STRATEGY,
    QR_CODE_STRATEGY, RESTAURANT_STRATEGY, SESSION_STRATEGY, TABLE_STRATEGY,
};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed encoded value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Prefix of every key the cache writes for its own bookkeeping
pub const RESERVED_PREFIX: &str = "__cache:";

/// Prefix of metadata records; the cache key follows it
pub const META_PREFIX: &str = "__cache:meta:";

/// Key of the persisted statistics snapshot
pub const STATS_KEY: &str = "__cache:stats";
