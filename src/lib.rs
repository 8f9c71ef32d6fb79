//! Unified Cache - TTL and tag aware caching service
//!
//! Sits in front of a primitive key-value store and gives read-heavy routes
//! get/set with stale grace windows, bulk invalidation by tag, cleanup,
//! warmup and hit-rate statistics.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod kv;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheService;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
