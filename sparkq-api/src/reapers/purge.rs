/// Purge reaper
///
/// Runs on a longer interval (default 1h). Deletes terminal tasks whose
/// `finished_at` predates `purge.older_than_days`, chunked at 500 rows per
/// transaction by `Store::purge_terminal` so a large purge never starves
/// the HTTP writer.
use chrono::{Duration as ChronoDuration, Utc};
use sparkq_core::store::Store;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const DEFAULT_INTERVAL_SECONDS: u64 = 3600;

pub fn spawn(
    store: Store,
    retention_days: u32,
    interval_seconds: u64,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let cutoff = Utc::now() - ChronoDuration::days(retention_days as i64);
                    match store.purge_terminal(cutoff).await {
                        Ok(0) => {}
                        Ok(n) => info!(purged = n, "purge reaper deleted terminal tasks"),
                        Err(e) => warn!(error = %e, "purge reaper tick failed"),
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("purge reaper shutting down");
                    break;
                }
            }
        }
    });
}
