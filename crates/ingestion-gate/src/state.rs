use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use webhook_common::{SubscriptionCache, TaskQueue};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub cache: Arc<SubscriptionCache>,
    pub queue: Arc<TaskQueue>,
}

impl axum::extract::FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
