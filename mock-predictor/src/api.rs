//! Prediction and health endpoints.

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use diagnox_common::{HealthResponse, PredictionResult};

use crate::error::{Error, Result};
use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/predict/:condition", post(predict))
        .route("/health", get(health))
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(&state.config.service_name))
}

/// POST /predict/{condition} - Pretend to run a model on the uploaded image.
async fn predict(
    State(state): State<Arc<AppState>>,
    Path(condition): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>> {
    if !state.config.conditions.iter().any(|c| *c == condition) {
        return Err(Error::NotFound(condition));
    }

    let mut multipart =
        multipart.map_err(|_| Error::Validation("expected a multipart form".to_string()))?;
    let filename = read_image(&mut multipart).await?;

    let (delay, probability) = {
        let mut rng = rand::thread_rng();
        (state.sampler.delay(&mut rng), state.sampler.probability(&mut rng))
    };
    tokio::time::sleep(delay).await;

    tracing::info!(
        "Received {}, predicting {:.2}% {}",
        filename.as_deref().unwrap_or("unnamed image"),
        probability * 100.0,
        condition
    );

    Ok(Json(PredictionResult::new(condition, probability)))
}

/// Consume the form until the `image` field, returning its filename.
async fn read_image(multipart: &mut Multipart) -> Result<Option<String>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().map(str::to_string);
            field.bytes().await.map_err(multipart_error)?;
            return Ok(filename);
        }
    }

    Err(Error::Validation("image is required".to_string()))
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge("upload exceeds the configured size limit".to_string())
    } else {
        tracing::debug!("Malformed multipart form: {}", e.body_text());
        Error::Validation("malformed multipart form".to_string())
    }
}
