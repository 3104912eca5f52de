//! Route definitions for the ChunkHub HTTP API.
//!
//! The three protocol endpoints sit at the root to match the wire contract
//! the upload client speaks; operational endpoints live under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(transfer_routes())
        .nest("/api", health_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Verify, upload, merge — the chunked-upload protocol surface.
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route("/verify/{filename}", get(handlers::transfer::verify_file))
        .route("/upload/{filename}", post(handlers::transfer::upload_chunk))
        .route("/merge/{filename}", get(handlers::transfer::merge_file))
}

/// Operational endpoints.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
