//! Background Tasks Module
//!
//! Contains background tasks the server binary may run alongside the API.
//!
//! # Tasks
//! - Cleanup: Purges expired cache entries at a configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
