// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR pipeline: DB detection followed by CTC recognition

use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use tracing::{debug, info};

use super::detection::{OcrDetectionModel, TextBox};
use super::engine::{EngineKind, OcrEngine, TextFragment};
use super::recognition::PaddleRecognizer;

pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";
pub const DICTIONARY_FILE: &str = "ppocr_keys_v1.txt";

/// Fragments recognized below this confidence are discarded
pub const DROP_SCORE: f32 = 0.5;

/// PaddleOCR model for text extraction
///
/// Combines text detection and recognition models for end-to-end OCR.
/// Expected files in the model directory:
/// - det_model.onnx (text detection)
/// - rec_model.onnx (text recognition)
/// - ppocr_keys_v1.txt (character dictionary)
#[derive(Debug, Clone)]
pub struct PaddleOcrEngine {
    detector: OcrDetectionModel,
    recognizer: PaddleRecognizer,
}

impl PaddleOcrEngine {
    pub fn load<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        let dir = model_dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!("PaddleOCR model directory not found: {}", dir.display());
        }

        let detector = OcrDetectionModel::new(dir.join(DETECTION_MODEL_FILE), intra_threads)?;
        let recognizer = PaddleRecognizer::new(
            &dir.join(RECOGNITION_MODEL_FILE),
            &dir.join(DICTIONARY_FILE),
            intra_threads,
        )?;

        info!("✅ PaddleOCR engine ready ({} dictionary entries)", recognizer.dictionary().len());
        Ok(Self {
            detector,
            recognizer,
        })
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Paddle
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextFragment>> {
        let boxes = self.detector.detect(image)?;
        let mut fragments = Vec::with_capacity(boxes.len());

        for text_box in &boxes {
            let Some(crop) = crop_box(image, text_box) else {
                continue;
            };

            let recognized = self.recognizer.recognize(&crop)?;
            if recognized.is_blank() || recognized.confidence < DROP_SCORE {
                debug!(
                    "Dropping fragment '{}' ({:.3})",
                    recognized.text, recognized.confidence
                );
                continue;
            }

            fragments.push(TextFragment::new(
                recognized.text.trim(),
                recognized.confidence,
                text_box.to_polygon(),
            ));
        }

        debug!(
            "PaddleOCR kept {} of {} detected regions",
            fragments.len(),
            boxes.len()
        );
        Ok(fragments)
    }
}

/// Crop a detected box out of the source image, or `None` if it is degenerate
pub fn crop_box(image: &DynamicImage, text_box: &TextBox) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();
    let x0 = text_box.x.floor().max(0.0) as u32;
    let y0 = text_box.y.floor().max(0.0) as u32;
    let x1 = ((text_box.x + text_box.width).ceil() as u32).min(img_w);
    let y1 = ((text_box.y + text_box.height).ceil() as u32).min(img_h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(image.crop_imm(x0, y0, x1 - x0, y1 - y0))
}
