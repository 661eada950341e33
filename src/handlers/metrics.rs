use axum::{http::StatusCode, response::IntoResponse};
use tracing::error;

pub async fn metrics_handler() -> impl IntoResponse {
    match crate::metrics::render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
