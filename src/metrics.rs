use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, TextEncoder, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total number of generate requests").unwrap();
    pub static ref REJECTED_TOTAL: Counter =
        register_counter!("gateway_rejected_total", "Requests rejected for a bad key or no credits").unwrap();
    pub static ref CREDITS_CONSUMED: Counter =
        register_counter!("gateway_credits_consumed_total", "Credits spent on generation attempts").unwrap();
    pub static ref GENERATION_FAILURES: Counter =
        register_counter!("gateway_generation_failures_total", "Backend calls that failed after a credit was spent").unwrap();
    pub static ref GENERATION_LATENCY: Histogram = register_histogram!(
        "gateway_generation_latency_seconds",
        "Inference backend latency in seconds"
    )
    .unwrap();
}

// Prometheus text exposition of the default registry
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
