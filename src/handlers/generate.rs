use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
};
use tracing::warn;

use crate::error::GatewayError;
use crate::gate::consume_and_generate;
use crate::ledger::fingerprint;
use crate::metrics::{REJECTED_TOTAL, REQUEST_TOTAL};
use crate::models::{GenerateQuery, GenerateResponse};
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

// POST /generate?prompt=...
pub async fn generate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<GenerateQuery>, QueryRejection>,
) -> Result<Json<GenerateResponse>, GatewayError> {
    REQUEST_TOTAL.inc();

    // a header that is not valid UTF-8 can never match a configured key
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let approved = match state.ledger.authorize(key) {
        Ok(approved) => approved,
        Err(rejected) => {
            REJECTED_TOTAL.inc();
            warn!(
                key = %key.map(fingerprint).unwrap_or_else(|| "<none>".to_string()),
                "Rejected: invalid API key, or no credits"
            );
            return Err(rejected.into());
        }
    };

    // checked after the key so a bad key always reads as 401, and before any credit is spent
    let Query(query) = query?;

    let result =
        consume_and_generate(&state.ledger, state.backend.as_ref(), &approved, &query.prompt).await;
    if matches!(result, Err(GatewayError::Rejected(_))) {
        REJECTED_TOTAL.inc();
    }

    result.map(|response| Json(GenerateResponse { response }))
}
