use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered webhook subscription: where deliveries go, what secret
/// signs them, and which event types it accepts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub target_url: String,
    pub secret_key: Option<String>,
    pub event_types: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// The event-type filter: an empty/absent filter accepts everything;
    /// otherwise the event type must be present and must exactly match
    /// (case-sensitive) one of the configured types.
    pub fn accepts_event_type(&self, event_type: Option<&str>) -> bool {
        let types = match &self.event_types {
            None => return true,
            Some(types) if types.is_empty() => return true,
            Some(types) => types,
        };

        match event_type {
            None => false,
            Some(event_type) => types.iter().any(|t| t == event_type),
        }
    }
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[validate(url)]
    pub target_url: String,

    pub secret_key: Option<String>,

    pub event_types: Option<Vec<String>>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct UpdateSubscriptionRequest {
    #[validate(url)]
    pub target_url: Option<String>,

    pub secret_key: Option<String>,

    pub event_types: Option<Vec<String>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub target_url: String,
    pub event_types: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            target_url: subscription.target_url,
            event_types: subscription.event_types,
            is_active: subscription.is_active,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_with_types(types: Option<Vec<String>>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            target_url: "http://t/ok".to_string(),
            secret_key: None,
            event_types: types,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_accepts_all_when_filter_absent() {
        let sub = sub_with_types(None);
        assert!(sub.accepts_event_type(None));
        assert!(sub.accepts_event_type(Some("anything")));
    }

    #[test]
    fn test_accepts_all_when_filter_empty() {
        let sub = sub_with_types(Some(vec![]));
        assert!(sub.accepts_event_type(Some("anything")));
    }

    #[test]
    fn test_rejects_missing_event_type_when_filter_set() {
        let sub = sub_with_types(Some(vec!["a".to_string()]));
        assert!(!sub.accepts_event_type(None));
    }

    #[test]
    fn test_exact_case_sensitive_match() {
        let sub = sub_with_types(Some(vec!["a".to_string(), "b".to_string()]));
        assert!(sub.accepts_event_type(Some("a")));
        assert!(!sub.accepts_event_type(Some("c")));
        assert!(!sub.accepts_event_type(Some("A")));
    }
}
