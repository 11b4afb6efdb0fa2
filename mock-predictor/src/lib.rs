//! Mock prediction service.
//!
//! Stands in for a real model server: waits a random interval and returns a
//! random probability for the requested condition.

pub mod api;
pub mod config;
pub mod error;
pub mod sampler;
pub mod state;

pub use config::Config;
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.api.max_upload_bytes);

    api::router()
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
