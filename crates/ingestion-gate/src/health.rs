//! Liveness/readiness/health endpoints, mirroring the delivery engine's.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::AppState;

/// Liveness probe: the process is up and serving requests.
pub async fn liveness_check() -> Json<Value> {
    Json(json!({
        "alive": true,
        "service": "ingestion-gate",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Readiness probe: the database pool and Redis connection are both
/// reachable. Used by orchestrators to gate traffic / restarts.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_ok = webhook_common::db::health_check(&state.pool).await.is_ok();

    let mut redis_conn = state.redis.clone();
    let redis_ok: bool = redis::cmd("PING")
        .query_async::<String>(&mut redis_conn)
        .await
        .map(|pong| pong == "PONG")
        .unwrap_or(false);

    let ready = db_ok && redis_ok;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "ready": ready,
            "database": db_ok,
            "redis": redis_ok,
        })),
    )
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ingestion-gate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
