//! Standalone maintenance entry point: runs a single retention sweep and
//! exits. Intended for a cron-style invocation alongside (or instead of)
//! the in-process sweep loop.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use webhook_common::SystemClock;
use webhook_config::AppConfig;
use webhook_delivery_engine::retention;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    webhook_common::init_tracing();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let pool = webhook_common::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to create database pool")?;

    let clock: Arc<dyn webhook_common::Clock> = Arc::new(SystemClock);
    let deleted = retention::sweep_once(&pool, clock.as_ref(), config.retry.log_retention_hours).await?;

    info!(deleted, "cleanup-logs sweep complete");
    println!("deleted {deleted} expired webhook_logs rows");
    Ok(())
}
