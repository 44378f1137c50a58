//! Status queries (C5 reads): `GET /status/deliveries/{id}` and
//! `GET /status/subscriptions/{id}/deliveries`.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;
use webhook_domain::{DeliveryStatusResponse, SubscriptionDeliveriesResponse};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;

pub async fn get_delivery_status(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> Result<Json<DeliveryStatusResponse>, ApiError> {
    let logs = webhook_common::log_store::logs_for_delivery(&state.pool, delivery_id).await?;

    let response = DeliveryStatusResponse::from_logs(delivery_id, logs)
        .ok_or_else(|| ApiError::NotFound("No delivery attempts found for this delivery id".to_string()))?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct DeliveriesQuery {
    limit: Option<i64>,
}

pub async fn get_subscription_deliveries(
    State(state): State<AppState>,
    Path(subscription_id): Path<Uuid>,
    Query(query): Query<DeliveriesQuery>,
) -> Result<Json<SubscriptionDeliveriesResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let counts =
        webhook_common::log_store::delivery_counts_for_subscription(&state.pool, subscription_id).await?;
    let recent_logs =
        webhook_common::log_store::recent_logs_for_subscription(&state.pool, subscription_id, limit)
            .await?;

    Ok(Json(SubscriptionDeliveriesResponse {
        subscription_id,
        total_deliveries: counts.total_deliveries as usize,
        successful_deliveries: counts.successful_deliveries as usize,
        failed_deliveries: counts.failed_deliveries as usize,
        recent_logs,
    }))
}
