use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Terminal/non-terminal status of a single delivery attempt.
///
/// `SUCCESS` and `FAILURE` are terminal: no further attempts follow for
/// that `delivery_id`. `FAILED_ATTEMPT` is non-terminal and implies a
/// retry has been (or is being) scheduled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "VARCHAR", rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Success,
    FailedAttempt,
    Failure,
}

impl DeliveryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Success | DeliveryStatus::Failure)
    }
}

/// An append-only attempt record (C5). Rows are never mutated; the store
/// assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WebhookLog {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub subscription_id: Uuid,
    pub target_url: String,
    pub event_type: Option<String>,
    pub payload: Value,
    pub attempt_number: i32,
    pub status_code: Option<i32>,
    pub status: DeliveryStatus,
    pub error_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new attempt row ready to be inserted; `id` and `created_at` are
/// assigned by the store on write.
#[derive(Debug, Clone)]
pub struct NewWebhookLog {
    pub delivery_id: Uuid,
    pub subscription_id: Uuid,
    pub target_url: String,
    pub event_type: Option<String>,
    pub payload: Value,
    pub attempt_number: i32,
    pub status_code: Option<i32>,
    pub status: DeliveryStatus,
    pub error_details: Option<String>,
}

/// The in-flight queue payload (C4 input). Durable until acknowledged by
/// the worker that dequeued it; redelivered on worker crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryTask {
    pub delivery_id: Uuid,
    pub subscription_id: Uuid,
    pub payload: Value,
    pub attempt_number: i32,
    pub event_type: Option<String>,
}

impl DeliveryTask {
    /// Build the task for the first attempt of a newly-accepted delivery.
    pub fn first_attempt(
        delivery_id: Uuid,
        subscription_id: Uuid,
        payload: Value,
        event_type: Option<String>,
    ) -> Self {
        Self {
            delivery_id,
            subscription_id,
            payload,
            attempt_number: 1,
            event_type,
        }
    }

    /// Build the retry task for the next attempt, carrying the same
    /// delivery identity and payload forward.
    pub fn next_attempt(&self) -> Self {
        Self {
            delivery_id: self.delivery_id,
            subscription_id: self.subscription_id,
            payload: self.payload.clone(),
            attempt_number: self.attempt_number + 1,
            event_type: self.event_type.clone(),
        }
    }
}

/// Response shape for `GET /status/deliveries/{delivery_id}`.
#[derive(Debug, Serialize)]
pub struct DeliveryStatusResponse {
    pub delivery_id: Uuid,
    pub subscription_id: Uuid,
    pub total_attempts: usize,
    pub latest_status: DeliveryStatus,
    pub latest_attempt: i32,
    pub logs: Vec<WebhookLog>,
}

impl DeliveryStatusResponse {
    /// `logs` must already be ordered by `created_at` ascending.
    pub fn from_logs(delivery_id: Uuid, logs: Vec<WebhookLog>) -> Option<Self> {
        let last = logs.last()?;
        Some(Self {
            delivery_id,
            subscription_id: last.subscription_id,
            total_attempts: logs.len(),
            latest_status: last.status,
            latest_attempt: last.attempt_number,
            logs,
        })
    }
}

/// Response shape for `GET /status/subscriptions/{id}/deliveries`.
#[derive(Debug, Serialize)]
pub struct SubscriptionDeliveriesResponse {
    pub subscription_id: Uuid,
    pub total_deliveries: usize,
    pub successful_deliveries: usize,
    pub failed_deliveries: usize,
    pub recent_logs: Vec<WebhookLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(
        delivery_id: Uuid,
        attempt_number: i32,
        status: DeliveryStatus,
        created_at: DateTime<Utc>,
    ) -> WebhookLog {
        WebhookLog {
            id: Uuid::new_v4(),
            delivery_id,
            subscription_id: Uuid::new_v4(),
            target_url: "http://t/ok".to_string(),
            event_type: None,
            payload: serde_json::json!({"e": "a"}),
            attempt_number,
            status_code: Some(200),
            status,
            error_details: None,
            created_at,
        }
    }

    #[test]
    fn test_next_attempt_increments_and_preserves_identity() {
        let delivery_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();
        let task = DeliveryTask::first_attempt(
            delivery_id,
            subscription_id,
            serde_json::json!({"e": "a"}),
            Some("a".to_string()),
        );
        assert_eq!(task.attempt_number, 1);

        let retry = task.next_attempt();
        assert_eq!(retry.attempt_number, 2);
        assert_eq!(retry.delivery_id, delivery_id);
        assert_eq!(retry.subscription_id, subscription_id);
        assert_eq!(retry.payload, task.payload);
    }

    #[test]
    fn test_delivery_status_response_from_logs() {
        let delivery_id = Uuid::new_v4();
        let now = Utc::now();
        let logs = vec![
            log(
                delivery_id,
                1,
                DeliveryStatus::FailedAttempt,
                now - chrono::Duration::seconds(20),
            ),
            log(delivery_id, 2, DeliveryStatus::Success, now),
        ];

        let response = DeliveryStatusResponse::from_logs(delivery_id, logs).unwrap();
        assert_eq!(response.total_attempts, 2);
        assert_eq!(response.latest_status, DeliveryStatus::Success);
        assert_eq!(response.latest_attempt, 2);
    }

    #[test]
    fn test_delivery_status_response_empty_logs_is_none() {
        assert!(DeliveryStatusResponse::from_logs(Uuid::new_v4(), vec![]).is_none());
    }

    #[test]
    fn test_is_terminal() {
        assert!(DeliveryStatus::Success.is_terminal());
        assert!(DeliveryStatus::Failure.is_terminal());
        assert!(!DeliveryStatus::FailedAttempt.is_terminal());
    }
}
