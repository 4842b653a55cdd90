// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers: scripted engines, multipart bodies and test images
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use serde_json::Value;
use smart_doc_verifier::{
    api::{create_app, AppState},
    config::ServiceConfig,
    vision::ocr::{engine::rect_polygon, EngineKind, OcrEngine, OcrService, TextFragment},
};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "----verifier-test-boundary";

/// Engine that returns a fixed script and counts invocations
pub struct ScriptedEngine {
    kind: EngineKind,
    words: Vec<(&'static str, f32)>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    pub fn new(kind: EngineKind, words: Vec<(&'static str, f32)>) -> Self {
        Self {
            kind,
            words,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(kind: EngineKind) -> Self {
        Self {
            fail: true,
            ..Self::new(kind, Vec::new())
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl OcrEngine for ScriptedEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn recognize(&self, _image: &DynamicImage) -> anyhow::Result<Vec<TextFragment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("session run failed");
        }
        Ok(self
            .words
            .iter()
            .enumerate()
            .map(|(i, (text, confidence))| {
                let x = i as f32 * 50.0;
                TextFragment::new(*text, *confidence, rect_polygon(x, 0.0, x + 40.0, 20.0))
            })
            .collect())
    }
}

/// App wired to the given engines, uploading into a fresh temp directory
pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new(paddle: Option<ScriptedEngine>, easy: Option<ScriptedEngine>) -> Self {
        Self::with_config(paddle, easy, |_| {})
    }

    pub fn with_config(
        paddle: Option<ScriptedEngine>,
        easy: Option<ScriptedEngine>,
        adjust: impl FnOnce(&mut ServiceConfig),
    ) -> Self {
        let upload_dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::default();
        config.upload.upload_dir = upload_dir.path().to_path_buf();
        adjust(&mut config);

        let service = OcrService::new(
            paddle.map(|e| Arc::new(e) as Arc<dyn OcrEngine>),
            easy.map(|e| Arc::new(e) as Arc<dyn OcrEngine>),
            2,
        );
        let router = create_app(AppState::new(config, service));
        Self { router, upload_dir }
    }

    pub async fn post_file(&self, uri: &str, filename: &str, data: &[u8]) -> (StatusCode, Value) {
        self.send(upload_request(uri, "file", filename, data)).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub fn upload_dir_is_empty(&self) -> bool {
        dir_is_empty(self.upload_dir.path())
    }
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, filename, data)))
        .unwrap()
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

/// Uniform gray PNG
pub fn gray_png(width: u32, height: u32, level: u8) -> Vec<u8> {
    let img = GrayImage::from_pixel(width, height, Luma([level]));
    encode(DynamicImage::ImageLuma8(img), ImageFormat::Png)
}

/// White page with dark horizontal bars standing in for text lines
pub fn document_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |_, y| {
        if (y / 6) % 3 == 1 {
            Rgb([20, 20, 20])
        } else {
            Rgb([245, 245, 245])
        }
    });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// Pseudo-random RGB noise, which compresses poorly
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9e37_79b9;
    let img = RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}
