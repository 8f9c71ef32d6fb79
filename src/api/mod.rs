//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `GET|PUT|DELETE /keys/:key` - Read, cache or drop a single key
//! - `POST /invalidate` - Delete every key sharing one of the given tags
//! - `POST /cleanup` - Purge expired entries and orphaned metadata
//! - `POST /warmup` - Pre-populate a batch of keys
//! - `GET /expiring` - Keys whose fresh window ends soon
//! - `GET /stats`, `POST /stats/reset` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
