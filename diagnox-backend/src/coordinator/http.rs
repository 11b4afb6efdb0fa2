//! HTTP prediction endpoint.

use async_trait::async_trait;
use diagnox_common::PredictionResult;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::PredictionEndpoint;
use crate::error::{Error, Result};
use crate::models::{DiagnosisRequest, UploadedImage};

/// A prediction endpoint reached over HTTP.
///
/// The image goes out as the multipart field `image`, alongside `exam_type`
/// and, when known, `patient_sex`. The endpoint answers with a JSON
/// `PredictionResult`.
pub struct HttpPredictionEndpoint {
    http_client: Client,
    name: String,
    url: String,
    condition: String,
}

impl HttpPredictionEndpoint {
    pub fn new(http_client: Client, name: &str, url: &str, condition: &str) -> Self {
        Self {
            http_client,
            name: name.to_string(),
            url: url.to_string(),
            condition: condition.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_form(&self, request: &DiagnosisRequest, image: &UploadedImage) -> Result<Form> {
        let content_type = image
            .image_content_type()
            .ok_or_else(|| Error::InvalidInput("Invalid file type. Only images are allowed.".to_string()))?;

        let part = Part::stream_with_length(image.bytes.clone(), image.bytes.len() as u64)
            .file_name(image.filename.clone().unwrap_or_else(|| "image".to_string()))
            .mime_str(content_type)
            .map_err(|_| Error::InvalidInput(format!("Malformed content type: {}", content_type)))?;

        let mut form = Form::new()
            .text("exam_type", request.exam_type.clone())
            .part("image", part);
        if let Some(ref sex) = request.patient_sex {
            form = form.text("patient_sex", sex.clone());
        }

        Ok(form)
    }
}

#[async_trait]
impl PredictionEndpoint for HttpPredictionEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn condition(&self) -> &str {
        &self.condition
    }

    async fn predict(
        &self,
        request: &DiagnosisRequest,
        image: &UploadedImage,
    ) -> Result<PredictionResult> {
        let form = self.build_form(request, image)?;

        tracing::debug!("Sending image to {}: {}", self.name, self.url);

        let response = self
            .http_client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Request to {} failed: {}", self.url, e);
                let reason = if e.is_timeout() {
                    "timed out"
                } else if e.is_connect() {
                    "unreachable"
                } else {
                    "request failed"
                };
                Error::upstream(&self.name, reason)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}: {}", self.name, status, body);
            return Err(Error::upstream(
                &self.name,
                format!("returned status {}", status.as_u16()),
            ));
        }

        let result: PredictionResult = response.json().await.map_err(|e| {
            tracing::warn!("Invalid response from {}: {}", self.name, e);
            Error::upstream(&self.name, "invalid response body")
        })?;

        if !result.is_valid() {
            return Err(Error::upstream(
                &self.name,
                format!("probability {} outside [0, 1]", result.probability),
            ));
        }

        Ok(result)
    }
}
