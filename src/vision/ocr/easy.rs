// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! EasyOCR pipeline: CRAFT detection followed by CRNN recognition

use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use std::path::Path;
use tracing::{debug, info};

use super::craft::{CraftDetector, WordBox};
use super::crnn::CrnnRecognizer;
use super::engine::{rect_polygon, EngineKind, OcrEngine, TextFragment};

pub const DETECTOR_MODEL_FILE: &str = "detector.onnx";
pub const RECOGNIZER_MODEL_FILE: &str = "recognizer.onnx";
/// Optional charset override for non-English recognizers
pub const CHARSET_FILE: &str = "characters.txt";

#[derive(Debug, Clone)]
pub struct EasyOcrEngine {
    detector: CraftDetector,
    recognizer: CrnnRecognizer,
}

impl EasyOcrEngine {
    pub fn load<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        let dir = model_dir.as_ref();
        if !dir.is_dir() {
            anyhow::bail!("EasyOCR model directory not found: {}", dir.display());
        }

        let detector = CraftDetector::new(dir.join(DETECTOR_MODEL_FILE), intra_threads)?;
        let charset_path = dir.join(CHARSET_FILE);
        let recognizer = CrnnRecognizer::new(
            dir.join(RECOGNIZER_MODEL_FILE),
            Some(charset_path.as_path()),
            intra_threads,
        )?;

        info!("✅ EasyOCR engine ready ({} classes)", recognizer.charset_size());
        Ok(Self {
            detector,
            recognizer,
        })
    }
}

impl OcrEngine for EasyOcrEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Easy
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextFragment>> {
        let lines = self.detector.detect(image)?;
        let mut fragments = Vec::with_capacity(lines.len());

        for line in &lines {
            let Some(crop) = crop_line(image, line) else {
                continue;
            };

            let output = self.recognizer.recognize(&crop)?;
            let text = output.text.trim();
            if text.is_empty() {
                continue;
            }

            fragments.push(TextFragment::new(
                text,
                output.confidence,
                rect_polygon(line.x_min, line.y_min, line.x_max, line.y_max),
            ));
        }

        debug!("EasyOCR recognized {} of {} lines", fragments.len(), lines.len());
        Ok(fragments)
    }
}

fn crop_line(image: &DynamicImage, line: &WordBox) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();
    let x0 = line.x_min.floor().max(0.0) as u32;
    let y0 = line.y_min.floor().max(0.0) as u32;
    let x1 = (line.x_max.ceil().max(0.0) as u32).min(img_w);
    let y1 = (line.y_max.ceil().max(0.0) as u32).min(img_h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(image.crop_imm(x0, y0, x1 - x0, y1 - y0))
}
