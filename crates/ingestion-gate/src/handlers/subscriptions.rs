//! Subscription CRUD: `POST/GET/PATCH/DELETE /subscriptions[/{id}]`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;
use webhook_domain::{CreateSubscriptionRequest, SubscriptionResponse, UpdateSubscriptionRequest};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub total: usize,
}

pub async fn create_subscription(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let subscription = webhook_common::subscription_store::create(
        &state.pool,
        &payload.target_url,
        payload.secret_key.as_deref(),
        payload.event_types.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(subscription)),
    ))
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<SubscriptionListResponse>, ApiError> {
    let subscriptions = webhook_common::subscription_store::list(&state.pool).await?;
    let total = subscriptions.len();
    Ok(Json(SubscriptionListResponse {
        subscriptions: subscriptions.into_iter().map(SubscriptionResponse::from).collect(),
        total,
    }))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = webhook_common::subscription_store::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;

    Ok(Json(SubscriptionResponse::from(subscription)))
}

pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let secret_key_update = payload.secret_key.as_deref().map(Some);

    let subscription = webhook_common::subscription_store::update(
        &state.pool,
        id,
        payload.target_url.as_deref(),
        secret_key_update,
        payload.event_types.as_deref(),
        payload.is_active,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;

    state.cache.invalidate(&id).await;

    Ok(Json(SubscriptionResponse::from(subscription)))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = webhook_common::subscription_store::delete(&state.pool, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Subscription not found".to_string()));
    }

    state.cache.invalidate(&id).await;

    Ok(StatusCode::NO_CONTENT)
}
