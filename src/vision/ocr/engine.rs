// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Common interface implemented by every OCR engine

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Four corner points, clockwise from top-left, in original image pixels
pub type Polygon = [[f32; 2]; 4];

/// Which OCR engine to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Paddle,
    Easy,
}

impl EngineKind {
    /// Short identifier used in routes and comparison results
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Paddle => "paddle",
            EngineKind::Easy => "easy",
        }
    }

    /// Human-readable engine name returned by the extract endpoints
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::Paddle => "PaddleOCR",
            EngineKind::Easy => "EasyOCR",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized piece of text with its location
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    /// Engine-reported confidence (0.0-1.0)
    pub confidence: f32,
    pub polygon: Polygon,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, confidence: f32, polygon: Polygon) -> Self {
        Self {
            text: text.into(),
            confidence,
            polygon,
        }
    }
}

/// A loaded OCR pipeline (detector + recognizer)
///
/// Implementations are shared across requests behind `Arc` and called from
/// the blocking thread pool, so `recognize` is synchronous.
pub trait OcrEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Detect and recognize text, returning fragments in reading order
    fn recognize(&self, image: &DynamicImage) -> anyhow::Result<Vec<TextFragment>>;
}

/// Axis-aligned rectangle as a clockwise polygon
pub fn rect_polygon(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Polygon {
    [
        [x_min, y_min],
        [x_max, y_min],
        [x_max, y_max],
        [x_min, y_max],
    ]
}
