// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR CTC recognizer

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::ctc::greedy_decode;
use super::preprocessing::recognition_tensor;
use super::session::OnnxModel;

/// Class labels of a PaddleOCR recognition head
///
/// Index 0 is the CTC blank, then one class per dictionary line (first
/// character only, empty lines skipped), then a trailing space class.
#[derive(Debug, Clone, PartialEq)]
pub struct CtcDictionary(Arc<Vec<char>>);

impl CtcDictionary {
    pub fn parse(content: &str) -> Self {
        let mut classes = vec!['\0'];
        classes.extend(content.lines().filter_map(|line| line.chars().next()));
        classes.push(' ');
        Self(Arc::new(classes))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("OCR character dictionary not found: {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Number of classes, blank and space included
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn classes(&self) -> &[char] {
        &self.0
    }
}

/// Text read from one crop
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean of the kept per-character maxima
    pub confidence: f32,
}

impl RecognizedText {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PaddleRecognizer {
    model: OnnxModel,
    dictionary: CtcDictionary,
}

impl PaddleRecognizer {
    /// Load rec_model.onnx and its dictionary
    pub fn new(model_path: &Path, dictionary_path: &Path, intra_threads: usize) -> Result<Self> {
        let dictionary = CtcDictionary::from_file(dictionary_path)?;
        info!("PaddleOCR dictionary: {} classes", dictionary.len());

        let model = OnnxModel::load(model_path, "PaddleOCR recognition", intra_threads)?;
        Ok(Self { model, dictionary })
    }

    pub fn dictionary(&self) -> &CtcDictionary {
        &self.dictionary
    }

    pub fn recognize(&self, crop: &DynamicImage) -> Result<RecognizedText> {
        let output = self.model.run(&recognition_tensor(crop))?;
        let decoded = greedy_decode(output.view(), self.dictionary.classes())?;

        let confidence = decoded.mean_score().clamp(0.0, 1.0);
        debug!("Read '{}' ({:.3})", decoded.text, confidence);
        Ok(RecognizedText {
            text: decoded.text,
            confidence,
        })
    }
}
