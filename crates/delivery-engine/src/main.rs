//! # Delivery Engine
//!
//! Consumes delivery tasks from the Redis-backed task queue and delivers
//! them to subscriber endpoints.
//!
//! ## Architecture
//!
//! ```text
//! Main Process
//!     │
//!     ├──> Worker pool (DELIVERY_WORKER_COUNT tokio tasks)
//!     │        each: BRPOP ready list -> resolve subscription -> POST -> log
//!     ├──> Scheduler (promotes due delayed tasks into the ready list)
//!     ├──> Retention sweep (deletes expired webhook_logs rows)
//!     └──> Health/metrics HTTP server
//! ```

use anyhow::Context;
use axum::{Router, routing::get};
use std::sync::Arc;
use tracing::{error, info};
use webhook_common::{ReqwestHttpClient, SubscriptionCache, SystemClock, TaskQueue};
use webhook_config::AppConfig;
use webhook_delivery_engine::state::AppState;
use webhook_delivery_engine::{health, metrics, retention, worker};

const DELIVERY_QUEUE_NAME: &str = "deliveries";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    webhook_common::init_tracing();

    info!("starting delivery engine");

    let config = Arc::new(AppConfig::from_env().context("failed to load configuration")?);
    info!(
        workers = config.server.delivery_worker_count,
        health_port = config.server.delivery_health_port,
        "configuration loaded"
    );

    let pool = webhook_common::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to create database pool")?;

    let redis_client = redis::Client::open(config.redis.url.clone())
        .context("failed to build redis client")?;
    let redis_manager = redis::aio::ConnectionManager::new(redis_client)
        .await
        .context("failed to connect to redis")?;

    let cache = Arc::new(SubscriptionCache::new(
        redis_manager.clone(),
        config.redis.subscription_cache_ttl_secs,
    ));
    let queue = Arc::new(TaskQueue::new(redis_manager.clone(), DELIVERY_QUEUE_NAME));

    let state = AppState {
        pool,
        redis: redis_manager,
        cache,
        queue,
        http_client: Arc::new(ReqwestHttpClient::new()),
        clock: Arc::new(SystemClock),
        config: config.clone(),
    };

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let health_state = state.clone();
    let health_port = config.server.delivery_health_port;
    tokio::spawn(async move {
        if let Err(e) = serve_health(health_port, health_state).await {
            error!(error = %e, "health server failed");
        }
    });

    let mut handles = Vec::new();
    for worker_id in 0..config.server.delivery_worker_count {
        let worker_state = state.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            worker::run(worker_id, worker_state, shutdown_rx).await;
        }));
    }

    let scheduler_state = state.clone();
    let scheduler_shutdown = shutdown_tx.subscribe();
    handles.push(tokio::spawn(async move {
        worker::run_scheduler(scheduler_state, scheduler_shutdown).await;
    }));

    let sweep_shutdown = shutdown_tx.subscribe();
    handles.push(tokio::spawn(retention::run(
        state.pool.clone(),
        state.clock.clone(),
        config.clone(),
        sweep_shutdown,
    )));

    info!("delivery engine ready, press Ctrl+C to shut down");
    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;

    info!("shutdown signal received, stopping workers");
    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), async {
        for handle in handles {
            let _ = handle.await;
        }
    })
    .await;

    info!("delivery engine stopped");
    Ok(())
}

async fn serve_health(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind health server to {addr}"))?;

    info!("health server listening on http://{}", addr);
    axum::serve(listener, app).await.context("health server failed")?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (axum::http::StatusCode, String)> {
    metrics::render_metrics().map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
