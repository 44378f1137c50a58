//! Shared subscription resolution: cache (C2) first, store on miss,
//! populating the cache on the way back. Used by both the ingestion gate
//! and the delivery engine so the read-through policy lives in one place.

use uuid::Uuid;
use webhook_domain::Subscription;

use crate::cache::{SubscriptionCache, SubscriptionSnapshot};
use crate::error::Result;

pub async fn load_subscription(
    pool: &sqlx::PgPool,
    cache: &SubscriptionCache,
    id: Uuid,
) -> Result<Option<Subscription>> {
    if let Some(cached) = cache.get(&id).await {
        return Ok(Some(Subscription {
            id: cached.id,
            target_url: cached.target_url,
            secret_key: cached.secret_key,
            event_types: Some(cached.event_types),
            is_active: cached.is_active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }));
    }

    let Some(stored) = crate::subscription_store::get(pool, id).await? else {
        return Ok(None);
    };

    cache
        .put(&SubscriptionSnapshot {
            id: stored.id,
            target_url: stored.target_url.clone(),
            secret_key: stored.secret_key.clone(),
            event_types: stored.event_types.clone().unwrap_or_default(),
            is_active: stored.is_active,
        })
        .await;

    Ok(Some(stored))
}
