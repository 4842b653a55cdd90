// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engines and the service wrapping them
//!
//! Both engines run pretrained ONNX models on CPU.
//!
//! Components:
//! - `paddle` - DB detection (`detection`) + CTC recognition (`recognition`)
//! - `easy` - CRAFT detection (`craft`) + CRNN recognition (`crnn`)
//! - `service` - engine dispatch, timing and result normalization
//! - `result` - response shapes shared by both engines

pub mod components;
pub mod craft;
pub mod crnn;
pub mod ctc;
pub mod detection;
pub mod easy;
pub mod engine;
pub mod paddle;
pub mod preprocessing;
pub mod recognition;
pub mod result;
pub mod service;
pub mod session;

pub use easy::EasyOcrEngine;
pub use engine::{EngineKind, OcrEngine, Polygon, TextFragment};
pub use paddle::PaddleOcrEngine;
pub use result::{ComparisonResult, ComparisonSummary, OcrResult};
pub use service::{OcrService, OcrServiceError};
