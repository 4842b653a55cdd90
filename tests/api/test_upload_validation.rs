// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Upload rejection: nothing invalid reaches disk or an engine

use axum::http::StatusCode;
use smart_doc_verifier::vision::ocr::EngineKind;
use std::sync::atomic::Ordering;

use super::common::{document_png, noise_png, upload_request, ScriptedEngine, TestApp};

const PADDLE_ROUTE: &str = "/api/v1/extract/paddle";

fn paddle_app() -> (TestApp, std::sync::Arc<std::sync::atomic::AtomicUsize>) {
    let engine = ScriptedEngine::new(EngineKind::Paddle, vec![("x", 0.9)]);
    let calls = engine.calls();
    (TestApp::new(Some(engine), None), calls)
}

#[tokio::test]
async fn test_missing_file_field() {
    let (app, calls) = paddle_app();

    let request = upload_request(PADDLE_ROUTE, "document", "scan.png", &document_png(20, 20));
    let (status, json) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No file provided");
    assert_eq!(json["error_type"], "missing_file");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disallowed_extension() {
    let (app, calls) = paddle_app();

    let (status, json) = app
        .post_file(PADDLE_ROUTE, "notes.txt", b"plain text, not an image")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid file format");
    assert_eq!(json["error_type"], "invalid_format");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_empty_filename() {
    let (app, _) = paddle_app();

    let (status, json) = app.post_file(PADDLE_ROUTE, "", &document_png(20, 20)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_format");
}

#[tokio::test]
async fn test_content_not_an_image() {
    let (app, calls) = paddle_app();

    let (status, json) = app
        .post_file(PADDLE_ROUTE, "fake.png", b"%PDF-1.4 definitely not a png")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_format");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_uppercase_extension_accepted() {
    let (app, _) = paddle_app();

    let (status, _) = app
        .post_file(PADDLE_ROUTE, "SCAN.PNG", &document_png(30, 30))
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversize_file_rejected_before_ocr() {
    let engine = ScriptedEngine::new(EngineKind::Paddle, vec![("x", 0.9)]);
    let calls = engine.calls();
    let app = TestApp::with_config(Some(engine), None, |config| {
        config.upload.max_file_size = 1024;
    });

    let data = noise_png(64, 64);
    assert!(data.len() > 1024);

    let (status, json) = app.post_file(PADDLE_ROUTE, "big.png", &data).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "File too large");
    assert_eq!(json["error_type"], "oversize_file");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_body_over_transport_limit_rejected() {
    let (app, calls) = {
        let engine = ScriptedEngine::new(EngineKind::Paddle, vec![("x", 0.9)]);
        let calls = engine.calls();
        let app = TestApp::with_config(Some(engine), None, |config| {
            config.upload.max_file_size = 1024;
        });
        (app, calls)
    };

    // Beyond the file cap plus multipart allowance
    let data = vec![0u8; 200 * 1024];
    let (status, _) = app.post_file(PADDLE_ROUTE, "huge.png", &data).await;

    assert!(status.is_client_error());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_file_exactly_at_limit_accepted() {
    let data = document_png(50, 50);
    let limit = data.len();
    let engine = ScriptedEngine::new(EngineKind::Paddle, vec![("x", 0.9)]);
    let app = TestApp::with_config(Some(engine), None, move |config| {
        config.upload.max_file_size = limit;
    });

    let (status, _) = app.post_file(PADDLE_ROUTE, "edge.png", &data).await;
    assert_eq!(status, StatusCode::OK);
}
