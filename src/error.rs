use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorDetail;

/// Detail string returned for unknown, missing, or exhausted keys.
pub const REJECTED_DETAIL: &str = "Invalid API key, or no credits";

/// The key is unknown or its balance is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid API key, or no credits")]
pub struct Rejected;

/// The inference backend could not produce text for an approved request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reply: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Rejected(#[from] Rejected),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Inference backend failed: {0}")]
    Generation(#[from] GenerationError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Rejected(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorDetail {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API keys configured; set API_KEY or pass --key KEY=CREDITS")]
    NoKeys,

    #[error("API keys must not be empty")]
    EmptyKey,
}
