/// Auto-fail reaper
///
/// Runs on a fixed interval (default 30s, `queue_runner.auto_fail_interval_seconds`).
/// Marks tasks that have been `running` for `timeout_seconds × 2` as
/// `failed`, and stamps an advisory `stale_warned_at` on tasks past their
/// nominal deadline but not yet failed.
use sparkq_core::scheduler::Scheduler;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub fn spawn(scheduler: Scheduler, interval_seconds: u64, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match scheduler.sweep_stale().await {
                        Ok(0) => {}
                        Ok(n) => info!(auto_failed = n, "auto-fail reaper swept stale tasks"),
                        Err(e) => warn!(error = %e, "auto-fail reaper tick failed"),
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("auto-fail reaper shutting down");
                    break;
                }
            }
        }
    });
}
