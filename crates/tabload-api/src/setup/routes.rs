//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tabload_core::Config;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Room for the non-file form fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            "/",
            get(handlers::index::index).post(handlers::index::submit),
        )
        .route("/hook", post(handlers::hook::hook))
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::liveness_check))
        .route(
            "/api/ingestions",
            get(handlers::ingestions::list_ingestions),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            config.max_file_size_bytes() + FORM_OVERHEAD_BYTES,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
