//! Logging and tracing setup
//!
//! Provides structured logging configuration using tracing.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for the application.
///
/// Picks compact or JSON output based on `LOG_FORMAT` (`json` switches to
/// structured output for log aggregation systems like Grafana Loki or the
/// ELK stack; anything else, including unset, keeps the compact format).
///
/// ```rust
/// webhook_common::init_tracing();
/// tracing::info!("server starting");
/// ```
pub fn init_tracing() {
    // Read log level from RUST_LOG env var, default to info
    // Examples:
    //   RUST_LOG=debug cargo run     -> debug and higher
    //   RUST_LOG=error cargo run     -> only errors
    //   RUST_LOG=webhook_common=trace cargo run  -> trace for this crate only
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        init_tracing_json(env_filter);
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true) // Show module path
                    .with_level(true) // Show log level
                    .with_thread_ids(true) // Show thread IDs
                    .with_file(true) // Show file and line
                    .compact(), // Compact format
            )
            .init();
    }
}

/// Initialize tracing with JSON output (for production)
///
/// Outputs logs in JSON format, better for log aggregation systems
/// like Grafana Loki, ELK stack, etc.
///
/// Example output:
/// ```json
/// {
///   "timestamp": "2025-10-03T10:30:45.123Z",
///   "level": "INFO",
///   "target": "webhook_delivery_engine::execute",
///   "fields": {
///     "message": "delivery attempt failed",
///     "delivery_id": "f2b5...",
///     "status_code": 503
///   }
/// }
/// ```
fn init_tracing_json(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json() // JSON format
                .with_target(true)
                .with_level(true)
                .with_current_span(true),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info, warn};

    #[test]
    fn test_tracing_init() {
        // Initialize tracing (only once per test suite)
        // Note: This might fail if already initialized in another test
        let _result = std::panic::catch_unwind(|| {
            init_tracing();
        });

        // Even if init fails (already initialized), we can still log
        info!("Test log message");
        warn!(count = 42, "Warning with structured data");
        error!(error = "test error", "Error message");
    }
}
