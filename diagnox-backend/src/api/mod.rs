//! Diagnosis HTTP API.

pub mod diagnose;
pub mod health;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(diagnose::router())
        .route("/health", get(health::health))
}
