// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end runs against downloaded ONNX exports
//!
//! Run with `--ignored` after placing the models under ./models.

use axum::http::StatusCode;
use image::GenericImageView;
use smart_doc_verifier::{
    api::{create_app, AppState},
    config::{EngineConfig, ServiceConfig},
    vision::{
        decode_image_bytes,
        ocr::{EasyOcrEngine, OcrEngine, PaddleOcrEngine},
        OcrModelManager,
    },
};
use tempfile::TempDir;
use tower::util::ServiceExt;

use super::common::{document_png, upload_request};

const PADDLE_MODEL_DIR: &str = "./models/paddleocr-onnx";
const EASY_MODEL_DIR: &str = "./models/easyocr-onnx";

fn page() -> image::DynamicImage {
    decode_image_bytes(&document_png(320, 120)).unwrap().0
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_paddle_engine_on_synthetic_page() {
    let engine = PaddleOcrEngine::load(PADDLE_MODEL_DIR, 2).unwrap();
    let image = page();
    let (width, height) = image.dimensions();

    for fragment in engine.recognize(&image).unwrap() {
        assert!((0.0..=1.0).contains(&fragment.confidence));
        for [x, y] in fragment.polygon {
            assert!(x >= 0.0 && x <= width as f32);
            assert!(y >= 0.0 && y <= height as f32);
        }
    }
}

#[test]
#[ignore] // Only run if model files are downloaded
fn test_easy_engine_on_synthetic_page() {
    let engine = EasyOcrEngine::load(EASY_MODEL_DIR, 2).unwrap();
    let fragments = engine.recognize(&page()).unwrap();
    assert!(fragments
        .iter()
        .all(|f| (0.0..=1.0).contains(&f.confidence)));
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_compare_route_with_real_engines() {
    let engines = EngineConfig {
        paddle_model_dir: Some(PADDLE_MODEL_DIR.into()),
        easy_model_dir: Some(EASY_MODEL_DIR.into()),
        max_concurrent_inferences: 1,
        intra_threads: 2,
    };
    let manager = OcrModelManager::new(&engines).await;
    assert!(manager.list_engines().iter().all(|e| e.available));

    let upload_dir = TempDir::new().unwrap();
    let mut config = ServiceConfig::default();
    config.upload.upload_dir = upload_dir.path().to_path_buf();
    config.engines = engines;
    let app = create_app(AppState::new(config, manager.into_service()));

    let request = upload_request("/api/v1/extract/compare", "file", "page.png", &document_png(320, 120));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(std::fs::read_dir(upload_dir.path()).unwrap().next().is_none());
}
