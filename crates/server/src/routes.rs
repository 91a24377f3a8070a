//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.upload_body_limit();

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/upload", post(handlers::upload))
        .route("/files", get(handlers::list_files))
        .route("/files/{handle}", delete(handlers::delete_file))
        .route("/download/{handle}", get(handlers::download))
        // Oversized bodies are refused at the transport before handler logic
        // runs; the per-file cap is enforced while streaming.
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
