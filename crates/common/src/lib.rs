//! # Webhook Delivery Service — Common Library
//!
//! Shared infrastructure used by both the ingestion gate and the delivery
//! engine:
//! - Database connection pooling (PostgreSQL via sqlx)
//! - The subscription cache (C2) and durable task queue, both Redis-backed
//! - HMAC signing/verification (C1)
//! - The `HttpClient` and `Clock` capability traits
//! - Custom error types
//! - Structured logging setup

// Module declarations
pub mod cache;
pub mod clock;
pub mod db;
pub mod error;
pub mod http_client;
pub mod log_store;
pub mod logging;
pub mod queue;
pub mod resolve;
pub mod signing;
pub mod subscription_store;

// Re-export commonly used types
pub use cache::{SubscriptionCache, SubscriptionSnapshot};
pub use clock::{Clock, SystemClock};
pub use db::create_pool;
pub use error::{Error, Result};
pub use http_client::{HttpClient, PostOutcome, ReqwestHttpClient};
pub use log_store::SubscriptionDeliveryCounts;
pub use logging::init_tracing;
pub use queue::TaskQueue;
pub use resolve::load_subscription;
pub use signing::{sign, strip_signature_prefix, verify};
