//! API Handlers
//!
//! HTTP request handlers for the admin and monitoring endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheService, CacheStats, CacheStatus};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::kv::{KeyValueStore, MemoryStore};
use crate::models::{
    CleanupResponse, DeleteResponse, ExpiringQuery, ExpiringResponse, GetResponse,
    HealthResponse, InvalidateRequest, InvalidateResponse, SetRequest, SetResponse,
    WarmupRequest, WarmupResponse,
};

/// Header reporting whether a read was served from cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheService>,
    /// Window used by GET /expiring when the query omits one
    pub expiring_window_minutes: u64,
}

impl AppState {
    /// Creates a new AppState over the given store.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self {
            cache: Arc::new(CacheService::new(store, config)),
            expiring_window_minutes: config.expiring_window_minutes,
        }
    }

    /// Creates a new AppState backed by an in-process store.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }
}

/// Handler for GET /keys/:key
///
/// Returns the cached JSON value with `X-Cache: HIT`, or 404 with `X-Cache: MISS`.
pub async fn get_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.cache.get::<Value>(&key).await {
        Some(value) => (
            [(CACHE_STATUS_HEADER, CacheStatus::Hit.header_value())],
            Json(GetResponse::new(key, value)),
        )
            .into_response(),
        None => (
            [(CACHE_STATUS_HEADER, CacheStatus::Miss.header_value())],
            CacheError::NotFound(key),
        )
            .into_response(),
    }
}

/// Handler for PUT /keys/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let strategy = req.strategy()?;
    state.cache.set(&key, &req.value, &strategy).await?;

    Ok(Json(SetResponse::new(key, req.strategy.to_lowercase())))
}

/// Handler for DELETE /keys/:key
///
/// Deleting a key that is not cached still succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(CacheError::Store(format!("Failed to delete key '{}'", key)));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let invalidated = state.cache.invalidate_by_tags(&req.tags).await;
    info!(tags = ?req.tags, invalidated, "Admin tag invalidation");

    Ok(Json(InvalidateResponse {
        tags: req.tags,
        invalidated,
    }))
}

/// Handler for POST /cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let cleaned = state.cache.cleanup().await;
    Json(CleanupResponse { cleaned })
}

/// Handler for POST /warmup
pub async fn warmup_handler(
    State(state): State<AppState>,
    Json(req): Json<WarmupRequest>,
) -> Result<Json<WarmupResponse>> {
    let entries = req.into_entries()?;
    let warmed = state.cache.warmup(&entries).await;

    Ok(Json(WarmupResponse {
        requested: entries.len(),
        warmed,
    }))
}

/// Handler for GET /expiring
pub async fn expiring_handler(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> Json<ExpiringResponse> {
    let within_minutes = query
        .within_minutes
        .unwrap_or(state.expiring_window_minutes);
    let keys = state.cache.get_expiring_keys(within_minutes).await;

    Json(ExpiringResponse {
        within_minutes,
        keys,
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.get_stats().await)
}

/// Handler for POST /stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Result<Json<CacheStats>> {
    state.cache.reset_stats().await?;
    Ok(Json(state.cache.get_stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
