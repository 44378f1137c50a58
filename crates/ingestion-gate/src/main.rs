//! # Ingestion Gate
//!
//! The inbound HTTP surface: accepts `POST /ingest/{subscription_id}`,
//! verifies the caller's HMAC signature, and pushes a delivery task onto
//! the Redis-backed queue for the delivery engine to pick up. Also
//! serves subscription management and delivery status queries.

use anyhow::Context;
use axum::{Router, routing::get};
use std::sync::Arc;
use tracing::info;
use webhook_common::{SubscriptionCache, TaskQueue};
use webhook_config::AppConfig;
use webhook_ingestion_gate::build_router;
use webhook_ingestion_gate::metrics;
use webhook_ingestion_gate::state::AppState;

const DELIVERY_QUEUE_NAME: &str = "deliveries";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    webhook_common::init_tracing();

    info!("starting ingestion gate");

    let config = Arc::new(AppConfig::from_env().context("failed to load configuration")?);
    info!(port = config.server.ingestion_gate_port, "configuration loaded");

    let pool = webhook_common::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to create database pool")?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!("database migrations applied");

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
    };

    let app = build_router(state);

    let metrics_app = Router::new().route("/metrics", get(metrics_handler));

    let addr = format!("0.0.0.0:{}", config.server.ingestion_gate_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind ingestion gate to {addr}"))?;

    let metrics_addr = "0.0.0.0:9090".to_string();
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics server to {metrics_addr}"))?;

    info!("ingestion gate listening on http://{}", addr);
    info!("metrics listening on http://{}", metrics_addr);

    tokio::select! {
        res = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()) => {
            res.context("ingestion gate server failed")?;
        }
        res = axum::serve(metrics_listener, metrics_app).with_graceful_shutdown(shutdown_signal()) => {
            res.context("metrics server failed")?;
        }
    }

    info!("ingestion gate shut down gracefully");
    Ok(())
}

async fn metrics_handler() -> Result<String, (axum::http::StatusCode, String)> {
    metrics::render_metrics()
        .map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::warn!("received ctrl-c, shutting down"); }
        _ = terminate => { tracing::warn!("received terminate signal, shutting down"); }
    }
}
