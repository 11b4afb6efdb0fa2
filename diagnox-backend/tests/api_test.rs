//! Integration tests for the diagnosis gateway HTTP API.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app, config_for, json_body, png, post_diagnose, MultipartBody};

async fn pneumonia_server(probability: f64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/pneumonia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "condition_name": "pneumonia",
            "probability": probability
        })))
        .mount(&server)
        .await;
    server
}

fn pneumonia_config(server: &MockServer) -> diagnox_backend::Config {
    config_for(&server.uri(), &[("pneumonia", "/predict/pneumonia", "pneumonia")])
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(diagnox_backend::Config::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "message": "Diagnox Backend is running!"})
    );
}

#[tokio::test]
async fn test_diagnose_relays_prediction() {
    let server = pneumonia_server(0.73).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .text("patient_sex", "M")
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "original_filename": "chest.png",
            "exam_type": "raio_x_torax",
            "results": [{"condition_name": "pneumonia", "probability": 0.73}],
            "patient_sex_considered": null
        })
    );
}

#[tokio::test]
async fn test_image_and_metadata_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/pneumonia"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"knee.jpg\""))
        .and(body_string_contains("idade_ossea"))
        .and(body_string_contains("name=\"patient_sex\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "condition_name": "pneumonia",
            "probability": 0.1
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "idade_ossea")
        .text("patient_sex", "F")
        .file("image", "knee.jpg", "image/jpeg", b"jpeg-bytes")
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["patient_sex_considered"], "F");
    assert_eq!(body["exam_type"], "idade_ossea");
}

#[tokio::test]
async fn test_non_image_rejected_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "report.pdf", "application/pdf", b"%PDF-1.4")
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["type"], "invalid_input");
}

#[tokio::test]
async fn test_missing_exam_type_is_422() {
    let server = pneumonia_server(0.5).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_missing_image_is_422() {
    let server = pneumonia_server(0.5).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new().text("exam_type", "raio_x_torax").finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_diseases_json_is_422() {
    let server = pneumonia_server(0.5).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .text("selected_diseases_json", "[pneumonia")
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "Validation failed: selected_diseases_json must be a JSON array of strings"
    );
}

#[tokio::test]
async fn test_bone_age_without_sex_is_422() {
    let server = pneumonia_server(0.5).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "idade_ossea")
        .file("image", "hand.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_non_multipart_body_is_422() {
    let app = app(diagnox_backend::Config::default());

    let request = Request::builder()
        .method("POST")
        .uri("/diagnose")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"exam_type": "raio_x_torax"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upstream_failure_is_502() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/pneumonia"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed: CUDA OOM"))
        .mount(&server)
        .await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "upstream_error");
    assert!(!body["error"]["message"].as_str().unwrap().contains("CUDA"));
}

#[tokio::test]
async fn test_out_of_range_probability_is_502() {
    let server = pneumonia_server(1.7).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_502() {
    let server = MockServer::start().await;
    let config = pneumonia_config(&server);
    drop(server);
    let app = app(config);

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_multiple_endpoints_with_disease_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict/pneumonia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "condition_name": "pneumonia",
            "probability": 0.6
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict/tb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "condition_name": "tuberculosis",
            "probability": 0.2
        })))
        .mount(&server)
        .await;

    let mut config = config_for(
        &server.uri(),
        &[
            ("pneumonia", "/predict/pneumonia", "pneumonia"),
            ("tb", "/predict/tb", "tuberculosis"),
        ],
    );
    config.routing.exams.insert(
        "raio_x_torax".to_string(),
        vec!["tb".to_string(), "pneumonia".to_string()],
    );
    let app = app(config);

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["results"],
        json!([
            {"condition_name": "tuberculosis", "probability": 0.2},
            {"condition_name": "pneumonia", "probability": 0.6}
        ])
    );

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .text("selected_diseases_json", r#"["pneumonia"]"#)
        .file("image", "chest.png", "image/png", png())
        .finish();
    let response = post_diagnose(&app, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["results"],
        json!([{"condition_name": "pneumonia", "probability": 0.6}])
    );
}

#[tokio::test]
async fn test_upload_over_limit_is_413() {
    let server = pneumonia_server(0.5).await;
    let mut config = pneumonia_config(&server);
    config.api.max_upload_bytes = 1024;
    let app = app(config);

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "big.png", "image/png", &vec![0u8; 4096])
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_large_image_relayed() {
    let server = pneumonia_server(0.4).await;
    let app = app(pneumonia_config(&server));

    let body = MultipartBody::new()
        .text("exam_type", "raio_x_torax")
        .file("image", "chest.png", "image/png", &vec![0xABu8; 3 * 1024 * 1024])
        .finish();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_truncated_multipart_has_fixed_message() {
    let app = app(diagnox_backend::Config::default());

    let body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"exam_type\"\r\n\r\nraio_x",
        common::BOUNDARY
    )
    .into_bytes();
    let response = post_diagnose(&app, body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "Validation failed: malformed multipart form"
    );
}

async fn preflight(app: axum::Router, origin: &str) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/diagnose")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = app(diagnox_backend::Config::default());

    let response = preflight(app, "http://localhost:3000").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_to_configured_origins() {
    let mut config = diagnox_backend::Config::default();
    config.cors.origins = "https://viewer.example, bad\u{1}origin ,https://pacs.example".to_string();
    let app = app(config);

    let response = preflight(app.clone(), "https://viewer.example").await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://viewer.example"
    );

    let response = preflight(app.clone(), "https://pacs.example").await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://pacs.example"
    );

    let response = preflight(app, "https://evil.example").await;
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_header_on_simple_request() {
    let app = app(diagnox_backend::Config::default());

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
