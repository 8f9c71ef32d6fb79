//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies and queries.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{CacheStrategy, StrategyCatalog, WarmupEntry};
use crate::error::{CacheError, Result};

/// Resolves a catalog strategy by name.
fn resolve_strategy(name: &str) -> Result<CacheStrategy> {
    StrategyCatalog::by_name(name).ok_or_else(|| CacheError::UnknownStrategy(name.to_string()))
}

/// Request body for PUT /keys/:key
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// Any JSON value
    pub value: Value,
    /// Catalog strategy name (`menu`, `table`, ...)
    pub strategy: String,
}

impl SetRequest {
    pub fn strategy(&self) -> Result<CacheStrategy> {
        resolve_strategy(&self.strategy)
    }
}

/// Request body for POST /invalidate
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub tags: Vec<String>,
}

impl InvalidateRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tags.is_empty() {
            return Some("At least one tag is required".to_string());
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Some("Tags cannot be empty".to_string());
        }
        None
    }
}

/// One entry of a warmup batch
#[derive(Debug, Clone, Deserialize)]
pub struct WarmupItem {
    pub key: String,
    pub value: Value,
    pub strategy: String,
}

/// Request body for POST /warmup
#[derive(Debug, Clone, Deserialize)]
pub struct WarmupRequest {
    pub entries: Vec<WarmupItem>,
}

impl WarmupRequest {
    /// Resolves every strategy name; one unknown name rejects the whole batch.
    pub fn into_entries(self) -> Result<Vec<WarmupEntry<Value>>> {
        self.entries
            .into_iter()
            .map(|item| {
                let strategy = resolve_strategy(&item.strategy)?;
                Ok(WarmupEntry::new(item.key, item.value, strategy))
            })
            .collect()
    }
}

/// Query string of GET /expiring
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpiringQuery {
    pub within_minutes: Option<u64>,
}
