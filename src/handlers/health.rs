use axum::{Json, extract::State, response::IntoResponse};

use crate::state::AppState;

// health handler, 200 even when the backend is down
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.backend.health().await;
    Json(serde_json::json!({
        "status": if backend { "healthy" } else { "degraded" },
        "backend": backend,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
