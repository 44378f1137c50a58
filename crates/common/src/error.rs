//! Error types for the webhook delivery service.
//!
//! Custom error enum that wraps all possible error types in the application.

use thiserror::Error;

/// Main error type used across the ingestion gate and delivery engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Database errors (Postgres via sqlx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis errors (subscription cache + durable queue)
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Outbound HTTP call to a subscriber's target_url failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for webhook delivery service operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("target_url is required".to_string());
        assert_eq!(err.to_string(), "Validation error: target_url is required");
    }

    #[test]
    fn test_error_conversion() {
        // Test that sqlx errors convert properly
        let sql_err = sqlx::Error::RowNotFound;
        let our_err: Error = sql_err.into();
        assert!(matches!(our_err, Error::Database(_)));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound("subscription 9f1c...".to_string());
        assert_eq!(err.to_string(), "Not found: subscription 9f1c...");
    }
}
