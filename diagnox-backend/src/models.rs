//! Request and response models for the diagnosis API.

use axum::body::Bytes;
use diagnox_common::{requires_patient_sex, PredictionResult};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Validated exam metadata from a `/diagnose` form.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisRequest {
    pub exam_type: String,
    pub patient_sex: Option<String>,
    /// Decoded from `selected_diseases_json`, order preserved.
    pub selected_diseases: Option<Vec<String>>,
}

impl DiagnosisRequest {
    /// Build a request from raw form values.
    ///
    /// Blank optional values count as absent. Bone-age exams must carry
    /// the patient's sex.
    pub fn from_form(
        exam_type: Option<String>,
        patient_sex: Option<String>,
        selected_diseases_json: Option<String>,
    ) -> Result<Self> {
        let exam_type = non_blank(exam_type)
            .ok_or_else(|| Error::Validation("exam_type is required".to_string()))?;
        let patient_sex = non_blank(patient_sex);

        if requires_patient_sex(&exam_type) && patient_sex.is_none() {
            return Err(Error::Validation(format!(
                "patient_sex is required for exam_type '{}'",
                exam_type
            )));
        }

        let selected_diseases = non_blank(selected_diseases_json)
            .map(|raw| parse_disease_list(&raw))
            .transpose()?;

        Ok(Self {
            exam_type,
            patient_sex,
            selected_diseases,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_disease_list(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|_| {
        Error::Validation("selected_diseases_json must be a JSON array of strings".to_string())
    })
}

/// The uploaded image, kept in memory for the lifetime of one request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl UploadedImage {
    /// Declared content type, if it is an image type.
    pub fn image_content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .filter(|ct| ct.starts_with("image/"))
    }

    pub fn ensure_image(&self) -> Result<()> {
        match self.image_content_type() {
            Some(_) => Ok(()),
            None => Err(Error::InvalidInput(
                "Invalid file type. Only images are allowed.".to_string(),
            )),
        }
    }
}

/// Aggregated diagnosis returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub original_filename: Option<String>,
    pub exam_type: String,
    pub results: Vec<PredictionResult>,
    /// Set only for bone-age exams.
    pub patient_sex_considered: Option<String>,
}

impl DiagnosisResponse {
    pub fn new(
        request: DiagnosisRequest,
        image: &UploadedImage,
        results: Vec<PredictionResult>,
    ) -> Self {
        let patient_sex_considered = if requires_patient_sex(&request.exam_type) {
            request.patient_sex
        } else {
            None
        };

        Self {
            original_filename: image.filename.clone(),
            exam_type: request.exam_type,
            results,
            patient_sex_considered,
        }
    }
}
