//! Expired-Entry Sweep Task
//!
//! Background task that periodically sweeps stale image cache records.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::ImageCache;

/// Spawns a background task that periodically sweeps expired records.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. A sweep that aborts on a storage failure is retried on
/// the next tick.
///
/// # Arguments
/// * `cache` - shared image cache
/// * `interval_secs` - seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ImageCache::new(Arc::new(MemoryStore::new())));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 3600);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<ImageCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting image cache sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = cache.sweep_expired().await;
            if report.aborted {
                warn!(
                    "Image cache sweep aborted after scanning {} records, retrying next interval",
                    report.scanned
                );
            }
        }
    })
}
