//! Subscription cache (C2): a best-effort, read-through cache over the
//! subscriptions store, backed by Redis.
//!
//! Every operation swallows Redis errors and degrades to a cache miss, so
//! a Redis outage never blocks or drops a delivery — callers always fall
//! back to the store.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

const DEFAULT_TTL_SECS: u64 = 3600;

/// Cached snapshot of a subscription, as needed by the delivery path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionSnapshot {
    pub id: Uuid,
    pub target_url: String,
    pub secret_key: Option<String>,
    pub event_types: Vec<String>,
    pub is_active: bool,
}

pub struct SubscriptionCache {
    manager: ConnectionManager,
    ttl_secs: u64,
}

impl SubscriptionCache {
    pub fn new(manager: ConnectionManager, ttl_secs: u64) -> Self {
        Self { manager, ttl_secs }
    }

    pub fn with_default_ttl(manager: ConnectionManager) -> Self {
        Self::new(manager, DEFAULT_TTL_SECS)
    }

    fn key(id: &Uuid) -> String {
        format!("subscription:{id}")
    }

    /// Read-through lookup. Returns `None` on either a genuine cache miss
    /// or any Redis error (logged and treated as a miss).
    pub async fn get(&self, id: &Uuid) -> Option<SubscriptionSnapshot> {
        let mut manager = self.manager.clone();
        let raw: Option<String> = match manager.get(Self::key(id)).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, subscription_id = %id, "subscription cache get failed, falling back to store");
                return None;
            }
        };

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, subscription_id = %id, "subscription cache entry corrupt, treating as miss");
                    None
                }
            },
            None => None,
        }
    }

    /// Best-effort write. Failures are logged, not propagated: a cache
    /// write failure must never fail the caller's delivery path.
    pub async fn put(&self, snapshot: &SubscriptionSnapshot) {
        let mut manager = self.manager.clone();
        let json = match serde_json::to_string(snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "failed to serialize subscription snapshot for cache");
                return;
            }
        };

        let result: redis::RedisResult<()> = manager
            .set_ex(Self::key(&snapshot.id), json, self.ttl_secs)
            .await;
        if let Err(e) = result {
            warn!(error = %e, subscription_id = %snapshot.id, "subscription cache put failed");
        }
    }

    /// Idempotent invalidation, called after every store mutation.
    pub async fn invalidate(&self, id: &Uuid) {
        let mut manager = self.manager.clone();
        let result: redis::RedisResult<()> = manager.del(Self::key(id)).await;
        if let Err(e) = result {
            warn!(error = %e, subscription_id = %id, "subscription cache invalidate failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            SubscriptionCache::key(&id),
            "subscription:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = SubscriptionSnapshot {
            id: Uuid::new_v4(),
            target_url: "http://t/ok".to_string(),
            secret_key: Some("k".to_string()),
            event_types: vec!["a".to_string(), "b".to_string()],
            is_active: true,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let round_tripped: SubscriptionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, round_tripped);
    }
}
