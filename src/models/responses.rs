//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::ExpiringKey;

/// Response body for GET /keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Strategy name the value was cached under
    pub strategy: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, strategy: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached successfully", key),
            key,
            strategy: strategy.into(),
        }
    }
}

/// Response body for DELETE /keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for POST /invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub tags: Vec<String>,
    /// Number of keys deleted
    pub invalidated: usize,
}

/// Response body for POST /cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub cleaned: usize,
}

/// Response body for POST /warmup
#[derive(Debug, Clone, Serialize)]
pub struct WarmupResponse {
    pub requested: usize,
    pub warmed: usize,
}

/// Response body for GET /expiring
#[derive(Debug, Clone, Serialize)]
pub struct ExpiringResponse {
    pub within_minutes: u64,
    pub keys: Vec<ExpiringKey>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("menu:7", json!({"items": ["tea"]}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "menu:7");
        assert_eq!(json["value"]["items"][0], "tea");
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", "menu");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
        assert!(json.contains("menu"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_key"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_expiring_response_serialize() {
        let resp = ExpiringResponse {
            within_minutes: 5,
            keys: vec![ExpiringKey {
                key: "k".to_string(),
                expires_at: 10,
                ttl_remaining_ms: 4,
            }],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["keys"][0]["expires_at"], 10);
        assert_eq!(json["keys"][0]["ttl_remaining_ms"], 4);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
