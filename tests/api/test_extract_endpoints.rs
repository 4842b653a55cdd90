// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Extraction routes: single engine, comparison and engine failures

use axum::http::StatusCode;
use smart_doc_verifier::vision::ocr::EngineKind;
use std::sync::atomic::Ordering;

use super::common::{document_png, ScriptedEngine, TestApp};

#[tokio::test]
async fn test_extract_paddle_success() {
    let paddle = ScriptedEngine::new(EngineKind::Paddle, vec![("Invoice", 0.9), ("42", 0.8)]);
    let calls = paddle.calls();
    let app = TestApp::new(Some(paddle), None);

    let (status, json) = app
        .post_file("/api/v1/extract/paddle", "scan.png", &document_png(120, 80))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["engine"], "PaddleOCR");
    assert_eq!(json["result"]["text"], "Invoice 42");
    assert_eq!(json["result"]["confidence"], 0.85);
    assert_eq!(json["result"]["word_count"], 2);
    assert_eq!(json["result"]["boxes"].as_array().unwrap().len(), 2);
    assert!(json["result"]["processing_time"].as_f64().unwrap() >= 0.0);
    assert!(json["result"].get("error").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_extract_easy_success() {
    let easy = ScriptedEngine::new(EngineKind::Easy, vec![("Total", 0.7)]);
    let app = TestApp::new(None, Some(easy));

    let (status, json) = app
        .post_file("/api/v1/extract/easy", "receipt.jpg", &document_png(90, 60))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["engine"], "EasyOCR");
    assert_eq!(json["result"]["text"], "Total");
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_extract_no_text_detected() {
    let app = TestApp::new(Some(ScriptedEngine::new(EngineKind::Paddle, vec![])), None);

    let (status, json) = app
        .post_file("/api/v1/extract/paddle", "blank.png", &document_png(40, 40))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["text"], "");
    assert_eq!(json["result"]["confidence"], 0.0);
    assert_eq!(json["result"]["error"], "No text detected");
    assert!(json["result"]["boxes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_engine_failure_reported_in_result() {
    let app = TestApp::new(Some(ScriptedEngine::failing(EngineKind::Paddle)), None);

    let (status, json) = app
        .post_file("/api/v1/extract/paddle", "scan.png", &document_png(40, 40))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["text"], "");
    assert_eq!(json["result"]["confidence"], 0.0);
    assert!(json["result"]["error"]
        .as_str()
        .unwrap()
        .contains("session run failed"));
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_missing_engine_is_503() {
    let app = TestApp::new(None, Some(ScriptedEngine::new(EngineKind::Easy, vec![])));

    let (status, json) = app
        .post_file("/api/v1/extract/paddle", "scan.png", &document_png(40, 40))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["success"], false);
    assert_eq!(json["error_type"], "engine_unavailable");
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_compare_picks_more_confident_engine() {
    let paddle = ScriptedEngine::new(EngineKind::Paddle, vec![("Hello", 0.95)]);
    let easy = ScriptedEngine::new(EngineKind::Easy, vec![("He11o", 0.6)]);
    let app = TestApp::new(Some(paddle), Some(easy));

    let (status, json) = app
        .post_file("/api/v1/extract/compare", "scan.png", &document_png(100, 50))
        .await;

    assert_eq!(status, StatusCode::OK);
    let comparison = &json["comparison"];
    assert_eq!(comparison["best_engine"], "paddle");
    assert_eq!(comparison["best_result"]["text"], "Hello");
    assert_eq!(comparison["paddle_result"]["confidence"], 0.95);
    assert_eq!(comparison["easy_result"]["confidence"], 0.6);
    assert_eq!(comparison["comparison"]["paddle_confidence"], 0.95);
    assert_eq!(comparison["comparison"]["easy_confidence"], 0.6);
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_compare_tie_goes_to_easy() {
    let paddle = ScriptedEngine::new(EngineKind::Paddle, vec![("left", 0.8)]);
    let easy = ScriptedEngine::new(EngineKind::Easy, vec![("right", 0.8)]);
    let app = TestApp::new(Some(paddle), Some(easy));

    let (status, json) = app
        .post_file("/api/v1/extract/compare", "scan.png", &document_png(100, 50))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["comparison"]["best_engine"], "easy");
    assert_eq!(json["comparison"]["best_result"]["text"], "right");
}

#[tokio::test]
async fn test_compare_requires_both_engines() {
    let paddle = ScriptedEngine::new(EngineKind::Paddle, vec![("x", 0.9)]);
    let calls = paddle.calls();
    let app = TestApp::new(Some(paddle), None);

    let (status, json) = app
        .post_file("/api/v1/extract/compare", "scan.png", &document_png(40, 40))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error_type"], "engine_unavailable");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
