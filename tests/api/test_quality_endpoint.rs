// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/v1/analyze/quality

use axum::http::StatusCode;

use super::common::{document_png, gray_png, TestApp};

const QUALITY_ROUTE: &str = "/api/v1/analyze/quality";

#[tokio::test]
async fn test_uniform_gray_image() {
    let app = TestApp::new(None, None);

    let (status, json) = app
        .post_file(QUALITY_ROUTE, "gray.png", &gray_png(50, 50, 128))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let analysis = &json["quality_analysis"];
    assert_eq!(analysis["blur_score"], 0.0);
    assert_eq!(analysis["brightness"], 128.0);
    assert_eq!(analysis["contrast"], 0.0);
    assert_eq!(analysis["resolution"], "50x50");
    assert_eq!(analysis["quality_assessment"], "fair (blurry, low contrast)");
    assert!(app.upload_dir_is_empty());
}

#[tokio::test]
async fn test_sharp_document_has_positive_scores() {
    let app = TestApp::new(None, None);

    let (status, json) = app
        .post_file(QUALITY_ROUTE, "page.png", &document_png(160, 90))
        .await;

    assert_eq!(status, StatusCode::OK);
    let analysis = &json["quality_analysis"];
    assert!(analysis["blur_score"].as_f64().unwrap() > 100.0);
    assert!(analysis["contrast"].as_f64().unwrap() > 20.0);
    assert_eq!(analysis["resolution"], "160x90");
}

#[tokio::test]
async fn test_quality_does_not_need_engines() {
    let app = TestApp::new(None, None);

    let (status, _) = app
        .post_file(QUALITY_ROUTE, "gray.bmp", &gray_png(10, 10, 200))
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_quality_rejects_empty_filename() {
    let app = TestApp::new(None, None);

    let (status, json) = app.post_file(QUALITY_ROUTE, "", b"").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_format");
}

#[tokio::test]
async fn test_truncated_png_is_rejected_and_removed() {
    let app = TestApp::new(None, None);

    let (status, json) = app
        .post_file(QUALITY_ROUTE, "bad.png", b"\x89PNG\r\n\x1a\n\0\0")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error_type"], "invalid_format");
    assert!(app.upload_dir_is_empty());
}
