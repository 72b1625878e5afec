//! Analyze API server library.
//!
//! Router construction lives here so integration tests can drive the
//! full HTTP surface without binding a socket.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

use analyze_core::limits::MAX_PAYLOAD_BYTES;
use state::AppState;

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/analyze",
            post(handlers::analyze).options(handlers::preflight),
        )
        .route(
            "/history",
            get(handlers::history)
                .delete(handlers::clear_history)
                .options(handlers::preflight),
        )
        .route(
            "/test",
            get(handlers::test_endpoint).options(handlers::preflight),
        )
        .route(
            "/download",
            get(handlers::download).options(handlers::preflight),
        )
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES as usize))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
