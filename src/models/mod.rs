//! Request and Response models for the admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ExpiringQuery, InvalidateRequest, SetRequest, WarmupItem, WarmupRequest};
pub use responses::{
    CleanupResponse, DeleteResponse, ExpiringResponse, GetResponse, HealthResponse,
    InvalidateResponse, SetResponse, WarmupResponse,
};
