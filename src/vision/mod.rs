// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based document analysis
//!
//! This module provides:
//! - Document enhancement and quality metrics
//! - OCR (Optical Character Recognition) via PaddleOCR and EasyOCR models

pub mod enhance;
pub mod image_utils;
pub mod model_manager;
pub mod ocr;
pub mod processor;
pub mod quality;

pub use image_utils::{decode_image_bytes, detect_format, open_image, to_gray, ImageError};
pub use model_manager::{EngineInfo, OcrModelManager};
pub use processor::{ImageProcessError, ImageProcessor};
pub use quality::QualityMetrics;
