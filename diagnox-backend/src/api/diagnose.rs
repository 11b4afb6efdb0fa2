//! Diagnosis endpoint.

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{DiagnosisRequest, DiagnosisResponse, UploadedImage};
use crate::state::AppState;

/// Build the diagnose router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/diagnose", post(diagnose))
}

/// Raw multipart fields before validation.
#[derive(Debug, Default)]
struct DiagnoseForm {
    exam_type: Option<String>,
    patient_sex: Option<String>,
    selected_diseases_json: Option<String>,
    image: Option<UploadedImage>,
}

impl DiagnoseForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "exam_type" => form.exam_type = Some(field.text().await.map_err(multipart_error)?),
                "patient_sex" => {
                    form.patient_sex = Some(field.text().await.map_err(multipart_error)?)
                }
                "selected_diseases_json" => {
                    form.selected_diseases_json = Some(field.text().await.map_err(multipart_error)?)
                }
                "image" => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.image = Some(UploadedImage {
                        bytes,
                        content_type,
                        filename,
                    });
                }
                other => tracing::debug!("Ignoring unexpected form field: {}", other),
            }
        }

        Ok(form)
    }

    /// Validate form fields. The image content type is checked separately.
    fn validate(self) -> Result<(DiagnosisRequest, UploadedImage)> {
        let request =
            DiagnosisRequest::from_form(self.exam_type, self.patient_sex, self.selected_diseases_json)?;
        let image = self
            .image
            .ok_or_else(|| Error::Validation("image is required".to_string()))?;
        Ok((request, image))
    }
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge("upload exceeds the configured size limit".to_string())
    } else {
        tracing::debug!("Malformed multipart form: {}", e.body_text());
        Error::Validation("malformed multipart form".to_string())
    }
}

/// POST /diagnose - Forward an exam image to prediction endpoints.
async fn diagnose(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<DiagnosisResponse>> {
    let multipart = multipart.map_err(|_| {
        Error::Validation("request body must be multipart/form-data".to_string())
    })?;

    let (request, image) = DiagnoseForm::read(multipart).await?.validate()?;
    image.ensure_image()?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        request_id = %request_id,
        exam_type = %request.exam_type,
        filename = image.filename.as_deref().unwrap_or("-"),
        size_bytes = image.bytes.len(),
        "Diagnosis request"
    );

    let results = state.coordinator.diagnose(&request, &image).await?;

    tracing::info!(
        request_id = %request_id,
        results = results.len(),
        "Diagnosis complete"
    );

    Ok(Json(DiagnosisResponse::new(request, &image, results)))
}
