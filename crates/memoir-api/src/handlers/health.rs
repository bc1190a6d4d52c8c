use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::AppState;

/// Liveness plus which backends are configured.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.lifecycle.store_backend().unwrap_or("none"),
        "generation": state.lifecycle.generator_model(),
    }))
}
