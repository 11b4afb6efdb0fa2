//! Diagnox Backend - relays exam images to prediction endpoints and
//! aggregates their results.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;

pub use config::Config;
pub use coordinator::{DiagnosisCoordinator, EndpointRegistry, HttpPredictionEndpoint, PredictionEndpoint};
pub use error::{Error, Result};
pub use models::{DiagnosisRequest, DiagnosisResponse, UploadedImage};
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;

/// Build the full application router with CORS, body limit and request logging.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);
    let body_limit = DefaultBodyLimit::max(state.config.api.max_upload_bytes);

    Router::new()
        .merge(api::router())
        .layer(body_limit)
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logger))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow-all for "*", otherwise only the listed origins.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.origins.trim() == "*" {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}
