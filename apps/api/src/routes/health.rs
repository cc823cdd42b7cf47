use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the loaded criteria count and active backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "o1a-api",
        "criteria_count": state.criteria.len(),
        "embedder": state.embedder.name(),
        "classifier": state.classifier.name(),
    }))
}
