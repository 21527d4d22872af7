// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /api/generate through the full router

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fabstir_image_proxy::{
    create_router, AppState, GenerationDispatcher, ServerConfig, StaticCredentials,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "proxy-test-boundary";
const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

fn router(server: &MockServer, credentials: StaticCredentials) -> Router {
    router_with_limit(server, credentials, ServerConfig::default().max_upload_bytes)
}

fn router_with_limit(
    server: &MockServer,
    credentials: StaticCredentials,
    max_upload_bytes: usize,
) -> Router {
    let config = ServerConfig {
        gemini_api_base: format!("{}/v1beta", server.uri()),
        gemini_model: "test-image-model".to_string(),
        ark_endpoint: format!("{}/ark/generations", server.uri()),
        max_upload_bytes,
        ..ServerConfig::default()
    };
    let dispatcher = GenerationDispatcher::from_config(&config, Arc::new(credentials)).unwrap();
    create_router(AppState::new(dispatcher), config.max_upload_bytes)
}

fn all_keys() -> StaticCredentials {
    StaticCredentials::new()
        .with_gemini("g-key")
        .with_ark("a-key")
}

fn multipart_request(fields: &[(&str, &str)], image: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"in.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn mount_ark(server: &MockServer, image: &[u8]) {
    Mock::given(method("POST"))
        .and(path("/ark/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"url": format!("{}/files/y.png", server.uri())}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/y.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ark_t2i_success_returns_base64() {
    let server = MockServer::start().await;
    mount_ark(&server, b"image-bytes-B").await;

    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "ark_t2i"), ("prompt", "a harbour at night")], None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"imageData": STANDARD.encode(b"image-bytes-B")}));
}

#[tokio::test]
async fn test_gemini_i2i_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-image-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": STANDARD.encode(b"gemini-out")}}
            ]}}]
        })))
        .mount(&server)
        .await;

    let png = STANDARD.decode(TINY_PNG_BASE64).unwrap();
    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "gemini_i2i"), ("prompt", "watercolour")], Some(&png)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imageData"], STANDARD.encode(b"gemini-out"));
}

#[tokio::test]
async fn test_urlencoded_body_is_accepted() {
    let server = MockServer::start().await;
    mount_ark(&server, b"xyz").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("model=ark_t2i&prompt=a+red+kite"))
        .unwrap();
    let (status, body) = send(router(&server, all_keys()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imageData"], STANDARD.encode(b"xyz"));
}

#[tokio::test]
async fn test_missing_prompt_is_400() {
    let server = MockServer::start().await;
    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "ark_t2i")], None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_model_is_400() {
    let server = MockServer::start().await;
    let (status, body) = send(
        router(&server, StaticCredentials::new()),
        multipart_request(&[("model", "dalle_t2i"), ("prompt", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("unknown model identifier"));
}

#[tokio::test]
async fn test_missing_key_is_400() {
    let server = MockServer::start().await;
    let (status, body) = send(
        router(&server, StaticCredentials::new().with_gemini("g-key")),
        multipart_request(&[("model", "ark_t2i"), ("prompt", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ARK_API_KEY"));
}

#[tokio::test]
async fn test_i2i_without_image_is_400() {
    let server = MockServer::start().await;
    for model in ["gemini_i2i", "ark_i2i"] {
        let (status, _) = send(
            router(&server, all_keys()),
            multipart_request(&[("model", model), ("prompt", "x")], None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "model {}", model);
    }
}

#[tokio::test]
async fn test_provider_error_is_500_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ark/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": "OutputImageSensitiveContentDetected", "message": "blocked"}
        })))
        .mount(&server)
        .await;

    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "ark_t2i"), ("prompt", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("OutputImageSensitiveContentDetected"));
}

#[tokio::test]
async fn test_gemini_safety_block_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/test-image-model:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let png = STANDARD.decode(TINY_PNG_BASE64).unwrap();
    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "gemini_i2i"), ("prompt", "x")], Some(&png)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("SAFETY"));
}

#[tokio::test]
async fn test_json_body_is_rejected() {
    let server = MockServer::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"model":"ark_t2i","prompt":"x"}"#))
        .unwrap();
    let (status, body) = send(router(&server, all_keys()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_empty_download_passes_through() {
    let server = MockServer::start().await;
    mount_ark(&server, b"").await;

    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "ark_t2i"), ("prompt", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"imageData": ""}));
}

#[tokio::test]
async fn test_long_provider_error_is_not_cut() {
    let server = MockServer::start().await;
    let value = format!("{}END_MARKER", "a".repeat(250));
    Mock::given(method("POST"))
        .and(path("/ark/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": value })))
        .mount(&server)
        .await;

    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "ark_t2i"), ("prompt", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains(&value));
}

#[tokio::test]
async fn test_null_provider_error_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ark/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": [{"url": format!("{}/files/y.png", server.uri())}]
        })))
        .mount(&server)
        .await;

    let (status, body) = send(
        router(&server, all_keys()),
        multipart_request(&[("model", "ark_t2i"), ("prompt", "x")], None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_oversize_upload_is_400_for_both_encodings() {
    let server = MockServer::start().await;
    let limit = 256;

    let big_image = vec![0x89u8; 4096];
    let (status, body) = send(
        router_with_limit(&server, all_keys(), limit),
        multipart_request(&[("model", "ark_i2i"), ("prompt", "x")], Some(&big_image)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("model=ark_t2i&prompt={}", "p".repeat(4096))))
        .unwrap();
    let (status, _) = send(router_with_limit(&server, all_keys(), limit), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
