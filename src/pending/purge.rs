//! Background worker that clears stale pending receipt files.
//!
//! Downloads never delete their file, so without this worker the holding area
//! would grow without bound.

use std::sync::Arc;
use std::time::Duration;

use super::PendingFileStore;

/// Runs forever, purging files older than `max_age` every `interval`.
pub async fn start_purge_worker(
    store: Arc<PendingFileStore>,
    interval: Duration,
    max_age: Duration,
) {
    log::info!(
        "Pending receipt purge worker started (every {}s, max age {}s)",
        interval.as_secs(),
        max_age.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        run_purge(&store, max_age).await;
    }
}

/// One purge pass. Failures are logged and retried on the next tick.
pub async fn run_purge(store: &PendingFileStore, max_age: Duration) -> usize {
    match store.purge_older_than(max_age).await {
        Ok(0) => {
            log::debug!("No stale pending receipts to purge");
            0
        }
        Ok(removed) => {
            log::info!("Purged {} stale pending receipt file(s)", removed);
            removed
        }
        Err(e) => {
            log::error!("Pending receipt purge failed: {}", e);
            0
        }
    }
}
