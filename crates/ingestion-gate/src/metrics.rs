/*!
 * Prometheus metrics for the ingestion gate.
 *
 * Exposed on `/metrics` for scraping.
 */

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, opts, register_histogram_vec,
    register_int_counter_vec,
};

lazy_static! {
    /// Ingested events by outcome: accepted, not_found, unauthorized, invalid.
    pub static ref INGEST_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("ingestion_gate_requests_total", "Total number of ingest requests"),
        &["outcome"]
    )
    .expect("metric can be created");

    /// Ingest request latency.
    pub static ref INGEST_DURATION: HistogramVec = register_histogram_vec!(
        "ingestion_gate_request_duration_seconds",
        "Ingest request duration in seconds",
        &["outcome"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("metric can be created");
}

/// Render metrics in Prometheus text format.
pub fn render_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
