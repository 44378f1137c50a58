//! Configuration loading for the webhook delivery service.
//!
//! Both the ingestion gate and the delivery engine call
//! [`AppConfig::from_env`], which reads a `.env` file (if present) and
//! then environment variables, applying the defaults from the
//! configuration table.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub retry: RetryConfig,
    pub server: ServerConfig,
}

/// PostgreSQL connection settings for the subscriptions/webhook_logs store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis connection settings; backs both the subscription cache (C2) and
/// the durable task queue.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub subscription_cache_ttl_secs: u64,
}

/// Retry/backoff and retention parameters from §6 of the specification.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_retry_attempts: i32,
    pub initial_retry_delay_secs: i64,
    pub backoff_factor: i64,
    pub webhook_timeout_secs: u64,
    pub log_retention_hours: i64,
    pub retention_sweep_interval_secs: u64,
}

/// HTTP server and worker pool sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub ingestion_gate_port: u16,
    pub delivery_health_port: u16,
    pub delivery_worker_count: usize,
}

impl AppConfig {
    /// Load configuration from the environment, applying defaults for
    /// every key the specification's configuration table marks optional.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(AppConfig {
            database: Self::load_database()?,
            redis: Self::load_redis()?,
            retry: Self::load_retry()?,
            server: Self::load_server()?,
        })
    }

    fn load_database() -> Result<DatabaseConfig> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_env_or("DATABASE_MAX_CONNECTIONS", 20),
        })
    }

    fn load_redis() -> Result<RedisConfig> {
        Ok(RedisConfig {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            subscription_cache_ttl_secs: parse_env_or("SUBSCRIPTION_CACHE_TTL", 3600),
        })
    }

    fn load_retry() -> Result<RetryConfig> {
        Ok(RetryConfig {
            max_retry_attempts: parse_env_or("MAX_RETRY_ATTEMPTS", 5),
            initial_retry_delay_secs: parse_env_or("INITIAL_RETRY_DELAY", 10),
            backoff_factor: parse_env_or("RETRY_BACKOFF_FACTOR", 2),
            webhook_timeout_secs: parse_env_or("WEBHOOK_TIMEOUT", 5),
            log_retention_hours: parse_env_or("LOG_RETENTION_HOURS", 72),
            retention_sweep_interval_secs: parse_env_or("RETENTION_SWEEP_INTERVAL", 3600),
        })
    }

    fn load_server() -> Result<ServerConfig> {
        Ok(ServerConfig {
            ingestion_gate_port: parse_env_or("INGESTION_GATE_PORT", 8080),
            delivery_health_port: parse_env_or("DELIVERY_HEALTH_PORT", 8081),
            delivery_worker_count: parse_env_or("DELIVERY_WORKER_COUNT", 4),
        })
    }
}

/// Parse an environment variable, falling back to `default` if unset or
/// unparseable.
fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that
    // mutate them so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_used_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::remove_var("MAX_RETRY_ATTEMPTS");
            env::remove_var("INITIAL_RETRY_DELAY");
        }
        let retry = AppConfig::load_retry().unwrap();
        assert_eq!(retry.max_retry_attempts, 5);
        assert_eq!(retry.initial_retry_delay_secs, 10);
        assert_eq!(retry.backoff_factor, 2);
        assert_eq!(retry.webhook_timeout_secs, 5);
        assert_eq!(retry.log_retention_hours, 72);
    }

    #[test]
    fn test_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::set_var("MAX_RETRY_ATTEMPTS", "3");
        }
        let retry = AppConfig::load_retry().unwrap();
        assert_eq!(retry.max_retry_attempts, 3);
        unsafe {
            env::remove_var("MAX_RETRY_ATTEMPTS");
        }
    }

    #[test]
    fn test_database_url_required() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            env::remove_var("DATABASE_URL");
        }
        let result = AppConfig::load_database();
        assert!(result.is_err());
    }
}
