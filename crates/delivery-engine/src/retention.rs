//! Retention sweep: deletes `webhook_logs` rows older than
//! `LOG_RETENTION_HOURS`. Runs on a background interval inside the long
//! running service, and is also exposed as a one-shot operation for the
//! standalone `cleanup-logs` binary.

use sqlx::PgPool;
use tokio::sync::broadcast;
use tracing::{error, info};
use webhook_common::Clock;
use webhook_config::AppConfig;

/// Runs a single sweep pass and returns the number of rows removed.
pub async fn sweep_once(pool: &PgPool, clock: &dyn Clock, retention_hours: i64) -> anyhow::Result<u64> {
    let deleted = webhook_common::log_store::sweep_expired(pool, clock.now(), retention_hours).await?;
    crate::metrics::RETENTION_SWEEP_ROWS_DELETED
        .with_label_values(&["webhook_logs"])
        .inc_by(deleted);
    Ok(deleted)
}

/// Background task: sweeps every `RETENTION_SWEEP_INTERVAL` seconds until
/// shutdown is signaled.
pub async fn run(
    pool: PgPool,
    clock: std::sync::Arc<dyn Clock>,
    config: std::sync::Arc<AppConfig>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(
        config.retry.retention_sweep_interval_secs,
    ));
    // The first tick fires immediately; skip it so the sweep runs on the
    // configured cadence rather than at startup.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match sweep_once(&pool, clock.as_ref(), config.retry.log_retention_hours).await {
                    Ok(deleted) if deleted > 0 => {
                        info!(deleted, "retention sweep removed expired webhook_logs rows");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "retention sweep failed"),
                }
            }
            _ = shutdown_rx.recv() => {
                info!("retention sweep received shutdown signal");
                break;
            }
        }
    }
}
