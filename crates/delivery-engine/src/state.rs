use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use webhook_common::{Clock, HttpClient, SubscriptionCache, TaskQueue};
use webhook_config::AppConfig;

/// Shared handles passed to every worker and the health/metrics server.
/// Intentionally a plain context object rather than process-wide
/// singletons, per the design notes on global mutable state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub cache: Arc<SubscriptionCache>,
    pub queue: Arc<TaskQueue>,
    pub http_client: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}
