/*!
 * Ingestion gate router integration tests.
 *
 * Exercises the full axum router (not individual handlers) against a
 * real Postgres and Redis: create a subscription, ingest a signed event,
 * and confirm the status endpoint reflects the accepted delivery.
 *
 * Run with: cargo test -p webhook-ingestion-gate --test integration_test -- --ignored
 * (requires PostgreSQL and Redis running)
 */

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use std::sync::Arc;
use tower::util::ServiceExt;
use webhook_common::{SubscriptionCache, TaskQueue, signing};
use webhook_config::AppConfig;
use webhook_ingestion_gate::build_router;
use webhook_ingestion_gate::state::AppState;

async fn test_state() -> AppState {
    let config = AppConfig::from_env().expect("failed to load configuration");

    let pool = PgPool::connect(&config.database.url)
        .await
        .expect("failed to connect to test database");

    let redis_client =
        redis::Client::open(config.redis.url.clone()).expect("failed to build redis client");
    let redis_manager = redis::aio::ConnectionManager::new(redis_client)
        .await
        .expect("failed to connect to redis");

    let cache = Arc::new(SubscriptionCache::new(
        redis_manager.clone(),
        config.redis.subscription_cache_ttl_secs,
    ));
    let queue = Arc::new(TaskQueue::new(redis_manager.clone(), "integration-test-deliveries"));

    AppState {
        pool,
        redis: redis_manager,
        cache,
        queue,
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("failed to parse response as JSON")
}

#[tokio::test]
#[ignore]
async fn test_create_and_fetch_subscription() {
    let state = test_state().await;
    let app = build_router(state);

    let payload = json!({"target_url": "https://example.com/hooks/integration"});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/subscriptions")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/subscriptions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = json_body(response).await;
    assert_eq!(fetched["target_url"], "https://example.com/hooks/integration");
}

#[tokio::test]
#[ignore]
async fn test_ingest_rejects_bad_signature() {
    let state = test_state().await;
    let app = build_router(state);

    let create_payload = json!({
        "target_url": "https://example.com/hooks/bad-sig",
        "secret_key": "s3cr3t",
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/subscriptions")
                .header("content-type", "application/json")
                .body(Body::from(create_payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    let subscription_id = created["id"].as_str().unwrap();

    let event_payload = json!({"event": "test"});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/ingest/{subscription_id}"))
                .header("content-type", "application/json")
                .header("X-Hub-Signature-256", "sha256=0000000000000000000000000000000000000000000000000000000000000000")
                .body(Body::from(event_payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_ingest_accepts_valid_signature_and_queues_delivery() {
    let state = test_state().await;
    let app = build_router(state);

    let secret = "ingest-test-secret";
    let create_payload = json!({
        "target_url": "https://example.com/hooks/good-sig",
        "secret_key": secret,
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/subscriptions")
                .header("content-type", "application/json")
                .body(Body::from(create_payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    let subscription_id = created["id"].as_str().unwrap();

    let event_payload = json!({"event": "order.created"});
    let body_bytes = serde_json::to_vec(&event_payload).unwrap();
    let signature = signing::sign(&body_bytes, secret);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/ingest/{subscription_id}"))
                .header("content-type", "application/json")
                .header("X-Hub-Signature-256", format!("sha256={signature}"))
                .body(Body::from(body_bytes))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let accepted = json_body(response).await;
    assert_eq!(accepted["status"], "accepted");
    assert!(accepted["delivery_id"].is_string());
}
