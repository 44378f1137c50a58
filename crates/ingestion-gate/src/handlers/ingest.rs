//! Ingestion endpoint (C3): `POST /ingest/{subscription_id}`.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Json, http::StatusCode};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use webhook_common::signing;
use webhook_domain::DeliveryTask;

use crate::error::ApiError;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const EVENT_TYPE_HEADER: &str = "x-webhook-event";

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub delivery_id: Uuid,
    pub message: String,
}

pub async fn ingest(
    State(state): State<AppState>,
    Path(subscription_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = webhook_common::load_subscription(&state.pool, &state.cache, subscription_id)
        .await?
        .ok_or_else(|| {
            crate::metrics::INGEST_REQUESTS_TOTAL.with_label_values(&["not_found"]).inc();
            ApiError::NotFound("Subscription not found".to_string())
        })?;

    let canonical_body = serde_json::to_vec(&payload).map_err(|e| ApiError::Internal(e.into()))?;

    if let Some(secret) = &subscription.secret_key {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                crate::metrics::INGEST_REQUESTS_TOTAL.with_label_values(&["unauthorized"]).inc();
                ApiError::Unauthorized("Signature required".to_string())
            })?;

        let provided = signing::strip_signature_prefix(provided);
        if !signing::verify(&canonical_body, provided, secret) {
            crate::metrics::INGEST_REQUESTS_TOTAL.with_label_values(&["unauthorized"]).inc();
            return Err(ApiError::Unauthorized("Invalid signature".to_string()));
        }
    }

    let event_type = headers
        .get(EVENT_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let delivery_id = Uuid::new_v4();
    let task = DeliveryTask::first_attempt(delivery_id, subscription_id, payload, event_type);

    state
        .queue
        .push_ready(&task)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    crate::metrics::INGEST_REQUESTS_TOTAL.with_label_values(&["accepted"]).inc();

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            status: "accepted",
            delivery_id,
            message: "Webhook queued for delivery".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_header_name_is_lowercase() {
        // axum's HeaderMap lookups are case-insensitive regardless, but the
        // constant documents the wire format from the specification.
        assert_eq!(SIGNATURE_HEADER, "x-hub-signature-256");
    }
}
