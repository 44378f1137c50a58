//! Subscription CRUD against the Postgres store.
//!
//! Plain parameterized queries via `sqlx::query_as`/`sqlx::query` — no
//! compile-time `query!` macro, since that requires a live database at
//! build time. Every value is bound, never interpolated into the SQL
//! string.

use sqlx::PgPool;
use uuid::Uuid;
use webhook_domain::Subscription;

use crate::error::Result;

pub async fn create(
    pool: &PgPool,
    target_url: &str,
    secret_key: Option<&str>,
    event_types: Option<&[String]>,
) -> Result<Subscription> {
    let row = sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (id, target_url, secret_key, event_types, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, true, now(), now())
        RETURNING id, target_url, secret_key, event_types, is_active, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(target_url)
    .bind(secret_key)
    .bind(event_types)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Subscription>> {
    let row = sqlx::query_as::<_, Subscription>(
        "SELECT id, target_url, secret_key, event_types, is_active, created_at, updated_at \
         FROM subscriptions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn list(pool: &PgPool) -> Result<Vec<Subscription>> {
    let rows = sqlx::query_as::<_, Subscription>(
        "SELECT id, target_url, secret_key, event_types, is_active, created_at, updated_at \
         FROM subscriptions ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Partial update: every `Some(..)` field is applied, `None` fields are
/// left unchanged. Returns `None` if no row with that id exists.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    target_url: Option<&str>,
    secret_key: Option<Option<&str>>,
    event_types: Option<&[String]>,
    is_active: Option<bool>,
) -> Result<Option<Subscription>> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Subscription>(
        "SELECT id, target_url, secret_key, event_types, is_active, created_at, updated_at \
         FROM subscriptions WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(existing) = existing else {
        tx.rollback().await?;
        return Ok(None);
    };

    let new_target_url = target_url.unwrap_or(&existing.target_url);
    let new_secret_key = match secret_key {
        Some(value) => value.map(|s| s.to_string()),
        None => existing.secret_key.clone(),
    };
    let new_event_types = event_types
        .map(|t| t.to_vec())
        .or(existing.event_types.clone());
    let new_is_active = is_active.unwrap_or(existing.is_active);

    let updated = sqlx::query_as::<_, Subscription>(
        r#"
        UPDATE subscriptions
        SET target_url = $2, secret_key = $3, event_types = $4, is_active = $5, updated_at = now()
        WHERE id = $1
        RETURNING id, target_url, secret_key, event_types, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(new_target_url)
    .bind(new_secret_key)
    .bind(new_event_types)
    .bind(new_is_active)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(updated))
}

/// Returns `true` if a row was deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
