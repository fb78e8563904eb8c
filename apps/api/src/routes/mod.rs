pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::generation;
use crate::history;
use crate::state::AppState;

/// 32 MiB upload ceiling — investment reports are rarely over a few MiB.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/convert", post(generation::handlers::handle_convert))
        .route("/api/v1/history", get(history::handlers::handle_history))
        .route(
            "/api/v1/history/:id/document",
            get(history::handlers::handle_document),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
