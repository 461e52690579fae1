pub mod health;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assessment;
use crate::intake;
use crate::ranking;
use crate::state::AppState;

/// 20 MiB — uploaded PDFs routinely exceed axum's 2 MiB default.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/extract", post(intake::handlers::handle_extract))
        .route("/api/v1/rank", post(ranking::handlers::handle_rank))
        .route(
            "/api/v1/report/:session_id",
            get(ranking::handlers::handle_report_download),
        )
        .route(
            "/api/v1/assessments",
            post(assessment::handlers::handle_create_assessment),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
