/*!
 * Ingestion Gate
 *
 * The authenticated inbound surface of the webhook delivery service:
 * accepts events for a subscription, verifies their HMAC signature, and
 * hands them to the durable task queue for the delivery engine to pick
 * up. Also owns subscription CRUD and delivery status queries.
 *
 * ## Endpoints
 *
 * - `POST /ingest/{subscription_id}` - accept an event for delivery
 * - `POST /subscriptions` - create a subscription
 * - `GET /subscriptions` - list subscriptions
 * - `GET /subscriptions/{id}` - fetch one subscription
 * - `PATCH /subscriptions/{id}` - update a subscription
 * - `DELETE /subscriptions/{id}` - delete a subscription
 * - `GET /status/deliveries/{delivery_id}` - attempt history for one delivery
 * - `GET /status/subscriptions/{id}/deliveries` - recent deliveries for a subscription
 * - `POST /tools/signature-generator` - compute the HMAC header for a payload
 * - `GET /health`, `GET /live`, `GET /ready` - health checks
 */

pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod state;

pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full router over a constructed [`AppState`].
pub fn build_router(state: AppState) -> Router {
    let app_routes = Router::new()
        .route("/ingest/{subscription_id}", post(handlers::ingest::ingest))
        .route(
            "/subscriptions",
            post(handlers::subscriptions::create_subscription)
                .get(handlers::subscriptions::list_subscriptions),
        )
        .route(
            "/subscriptions/{id}",
            get(handlers::subscriptions::get_subscription)
                .patch(handlers::subscriptions::update_subscription)
                .delete(handlers::subscriptions::delete_subscription),
        )
        .route(
            "/status/deliveries/{delivery_id}",
            get(handlers::status::get_delivery_status),
        )
        .route(
            "/status/subscriptions/{id}/deliveries",
            get(handlers::status::get_subscription_deliveries),
        )
        .route(
            "/tools/signature-generator",
            post(handlers::tools::generate_signature),
        )
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .with_state(state);

    Router::new().merge(app_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
