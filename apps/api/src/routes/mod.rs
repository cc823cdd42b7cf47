pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::report;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Leave headroom above the upload cap so oversized files reach the
    // handler and get a proper 413 body instead of a connection reset.
    let body_limit = state.config.max_upload_bytes + 1024 * 1024;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/criteria", get(handlers::handle_get_criteria))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/analyze/batch",
            post(handlers::handle_batch_analyze),
        )
        .route("/api/v1/report", post(report::handle_report))
        .route("/api/v1/stats", get(handlers::handle_stats))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
