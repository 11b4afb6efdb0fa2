//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use diagnox_common::HealthResponse;

use crate::state::AppState;

/// GET /health - Liveness only; prediction endpoints are not probed.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(&state.config.service_name))
}
