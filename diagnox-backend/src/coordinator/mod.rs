//! Diagnosis coordination.
//!
//! This module defines the `PredictionEndpoint` trait that abstracts a
//! downstream model service, and the `DiagnosisCoordinator` that fans an
//! uploaded image out to the endpoints routed for its exam type.

mod http;
mod registry;

pub use http::HttpPredictionEndpoint;
pub use registry::EndpointRegistry;

use async_trait::async_trait;
use diagnox_common::PredictionResult;
use futures_util::future::try_join_all;

use crate::config::Config;
use crate::error::Result;
use crate::models::{DiagnosisRequest, UploadedImage};

/// A downstream service that scores one condition from an image.
#[async_trait]
pub trait PredictionEndpoint: Send + Sync {
    /// Configured endpoint name, used in logs and errors.
    fn name(&self) -> &str;

    /// Condition this endpoint predicts (matched against selected diseases).
    fn condition(&self) -> &str;

    /// Send the image and exam metadata, returning the endpoint's prediction.
    async fn predict(
        &self,
        request: &DiagnosisRequest,
        image: &UploadedImage,
    ) -> Result<PredictionResult>;
}

/// Routes diagnosis requests to prediction endpoints and collects results.
pub struct DiagnosisCoordinator {
    registry: EndpointRegistry,
}

impl DiagnosisCoordinator {
    pub fn new(registry: EndpointRegistry) -> Self {
        Self { registry }
    }

    /// Build a coordinator with HTTP endpoints from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(EndpointRegistry::from_config(config)?))
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Run every routed endpoint for the request's exam type.
    ///
    /// Calls run concurrently; results keep routing order. Any endpoint
    /// failure fails the whole diagnosis.
    pub async fn diagnose(
        &self,
        request: &DiagnosisRequest,
        image: &UploadedImage,
    ) -> Result<Vec<PredictionResult>> {
        let mut endpoints = self.registry.route(&request.exam_type);

        if let Some(selected) = request.selected_diseases.as_ref().filter(|s| !s.is_empty()) {
            endpoints.retain(|endpoint| {
                selected
                    .iter()
                    .any(|disease| disease.eq_ignore_ascii_case(endpoint.condition()))
            });
        }

        if endpoints.is_empty() {
            tracing::warn!(
                exam_type = %request.exam_type,
                "No prediction endpoint matches this exam, returning empty results"
            );
            return Ok(Vec::new());
        }

        let calls = endpoints.iter().map(|endpoint| async move {
            tracing::debug!(endpoint = endpoint.name(), "Calling prediction endpoint");
            endpoint.predict(request, image).await.map_err(|e| {
                tracing::warn!(endpoint = endpoint.name(), "Prediction failed: {}", e);
                e
            })
        });

        try_join_all(calls).await
    }
}
