//! Cleanup Task
//!
//! Optional background loop that calls `cleanup()` on an interval. The cache
//! engine itself owns no timer; the server binary decides whether to run this.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::CacheService;

/// Spawns a background task that periodically purges expired cache entries
/// and orphaned metadata.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.cache.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<CacheService>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    // tokio intervals reject a zero period
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            interval_secs = cleanup_interval_secs,
            "Starting cache cleanup task"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        // A slow pass pushes the next one back instead of firing a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let started = Instant::now();
            let removed = cache.cleanup().await;

            if removed > 0 {
                info!(
                    removed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Cache cleanup pass finished"
                );
            } else {
                debug!("Cache cleanup: nothing to remove");
            }
        }
    })
}
