//! Key-Value Store Module
//!
//! The primitive storage contract the cache sits on, plus an in-process
//! implementation with store-side TTL expiry.

mod memory;

#[cfg(test)]
pub(crate) mod flaky;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;

// == Key-Value Store ==
/// Primitive string key-value store with per-key TTL.
///
/// The store expires a key on its own once `ttl_seconds` have elapsed,
/// regardless of what the cache layer believes about the entry. It has no
/// way to query by anything other than key prefix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, replacing any previous one. `None` means no expiry.
    async fn put(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Lists live key names, optionally restricted to a prefix.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>>;
}
