//! Attempt log (C5): append-only writes and the aggregate reads behind
//! the status endpoints, against the Postgres store.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use webhook_domain::{DeliveryStatus, NewWebhookLog, WebhookLog};

use crate::error::Result;

/// Writes exactly one row. Called unconditionally on every attempt,
/// including pre-HTTP terminations (subscription not found/inactive,
/// event-type mismatch) so every accepted delivery has at least one row.
pub async fn append(pool: &PgPool, log: NewWebhookLog) -> Result<WebhookLog> {
    let row = sqlx::query_as::<_, WebhookLog>(
        r#"
        INSERT INTO webhook_logs
            (id, delivery_id, subscription_id, target_url, event_type, payload, attempt_number, status_code, status, error_details, created_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        RETURNING id, delivery_id, subscription_id, target_url, event_type, payload, attempt_number, status_code, status, error_details, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(log.delivery_id)
    .bind(log.subscription_id)
    .bind(log.target_url)
    .bind(log.event_type)
    .bind(log.payload)
    .bind(log.attempt_number)
    .bind(log.status_code)
    .bind(log.status)
    .bind(log.error_details)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// All rows for a delivery, ordered by `created_at` ascending.
pub async fn logs_for_delivery(pool: &PgPool, delivery_id: Uuid) -> Result<Vec<WebhookLog>> {
    let rows = sqlx::query_as::<_, WebhookLog>(
        "SELECT id, delivery_id, subscription_id, target_url, event_type, payload, attempt_number, status_code, status, error_details, created_at \
         FROM webhook_logs WHERE delivery_id = $1 ORDER BY created_at ASC",
    )
    .bind(delivery_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The last N rows for a subscription, ordered by `created_at` descending.
pub async fn recent_logs_for_subscription(
    pool: &PgPool,
    subscription_id: Uuid,
    limit: i64,
) -> Result<Vec<WebhookLog>> {
    let rows = sqlx::query_as::<_, WebhookLog>(
        "SELECT id, delivery_id, subscription_id, target_url, event_type, payload, attempt_number, status_code, status, error_details, created_at \
         FROM webhook_logs WHERE subscription_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(subscription_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Per-subscription delivery counts, `DISTINCT delivery_id`, per the
/// at-least-once/duplicate-row tolerant design.
pub struct SubscriptionDeliveryCounts {
    pub total_deliveries: i64,
    pub successful_deliveries: i64,
    pub failed_deliveries: i64,
}

pub async fn delivery_counts_for_subscription(
    pool: &PgPool,
    subscription_id: Uuid,
) -> Result<SubscriptionDeliveryCounts> {
    let row: (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(DISTINCT delivery_id),
            COUNT(DISTINCT delivery_id) FILTER (WHERE status = $2),
            COUNT(DISTINCT delivery_id) FILTER (WHERE status = $3)
        FROM webhook_logs
        WHERE subscription_id = $1
        "#,
    )
    .bind(subscription_id)
    .bind(DeliveryStatus::Success)
    .bind(DeliveryStatus::Failure)
    .fetch_one(pool)
    .await?;

    Ok(SubscriptionDeliveryCounts {
        total_deliveries: row.0,
        successful_deliveries: row.1,
        failed_deliveries: row.2,
    })
}

/// Deletes rows older than `now - retention_hours`. Returns the number of
/// rows removed.
pub async fn sweep_expired(pool: &PgPool, now: DateTime<Utc>, retention_hours: i64) -> Result<u64> {
    let cutoff = now - chrono::Duration::hours(retention_hours);
    let result = sqlx::query("DELETE FROM webhook_logs WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_computation() {
        let now = Utc::now();
        let retention_hours = 72;
        let cutoff = now - chrono::Duration::hours(retention_hours);
        assert_eq!(now - cutoff, chrono::Duration::hours(72));
    }
}
