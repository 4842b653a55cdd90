// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET / health and route listing

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use smart_doc_verifier::vision::ocr::EngineKind;

use super::common::{ScriptedEngine, TestApp};

fn get_root() -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_lists_routes() {
    let app = TestApp::new(
        Some(ScriptedEngine::new(EngineKind::Paddle, vec![])),
        Some(ScriptedEngine::new(EngineKind::Easy, vec![])),
    );

    let (status, json) = app.send(get_root()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["message"], "Smart Document Verifier API v1.0");

    let endpoints = json["endpoints"].as_object().unwrap();
    assert_eq!(endpoints.len(), 4);
    assert_eq!(
        endpoints["POST /api/v1/extract/paddle"],
        "Extract text using PaddleOCR"
    );
    assert_eq!(endpoints["POST /api/v1/analyze/quality"], "Analyze image quality");
}

#[tokio::test]
async fn test_health_degraded_without_engine() {
    let app = TestApp::new(Some(ScriptedEngine::new(EngineKind::Paddle, vec![])), None);

    let (status, json) = app.send(get_root()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");

    let engines = json["engines"].as_array().unwrap();
    assert_eq!(engines[0]["engine"], "paddle");
    assert_eq!(engines[0]["available"], true);
    assert_eq!(engines[1]["name"], "EasyOCR");
    assert_eq!(engines[1]["available"], false);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new(None, None);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/extract/tesseract")
        .body(Body::empty())
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
