//! Shared helpers for gateway integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use diagnox_backend::config::EndpointConfig;
use diagnox_backend::{build_router, AppState, Config, DiagnosisCoordinator};
use tower::ServiceExt;

pub const BOUNDARY: &str = "diagnox-test-boundary";

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

pub fn png() -> &'static [u8] {
    b"\x89PNG\r\n\x1a\nfake-image-data"
}

/// Config whose endpoints all live on the given mock server.
///
/// `endpoints` are (name, path, condition) triples; the first one is the default route.
pub fn config_for(server_uri: &str, endpoints: &[(&str, &str, &str)]) -> Config {
    let mut config = Config::default();
    config.upstream.timeout_secs = 5;
    config.endpoints = endpoints
        .iter()
        .map(|(name, path, condition)| {
            (
                name.to_string(),
                EndpointConfig {
                    url: format!("{}{}", server_uri, path),
                    condition: Some(condition.to_string()),
                },
            )
        })
        .collect();
    config.routing.default = endpoints
        .first()
        .map(|(name, _, _)| vec![name.to_string()])
        .unwrap_or_default();
    config
}

pub fn app(config: Config) -> Router {
    let coordinator = DiagnosisCoordinator::from_config(&config).unwrap();
    build_router(Arc::new(AppState::new(config, coordinator)))
}

pub async fn post_diagnose(app: &Router, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/diagnose")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
