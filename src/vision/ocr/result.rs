// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalized OCR output shared by both engines

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::engine::{EngineKind, Polygon, TextFragment};

/// Error message reported when an engine finds nothing
pub const NO_TEXT_DETECTED: &str = "No text detected";

/// Result of a single engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Fragments joined by single spaces, in detection order
    pub text: String,
    /// Mean fragment confidence, 3 decimals
    pub confidence: f64,
    pub boxes: Vec<Polygon>,
    /// Engine wall time in seconds, 3 decimals
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OcrResult {
    /// Aggregate engine fragments into a result
    ///
    /// An empty fragment list yields the "No text detected" result.
    pub fn from_fragments(fragments: Vec<TextFragment>, elapsed: Duration) -> Self {
        if fragments.is_empty() {
            return Self::no_text(elapsed);
        }

        let count = fragments.len();
        let mean = fragments.iter().map(|f| f.confidence as f64).sum::<f64>() / count as f64;

        let mut texts = Vec::with_capacity(count);
        let mut boxes = Vec::with_capacity(count);
        for fragment in fragments {
            texts.push(fragment.text);
            boxes.push(fragment.polygon);
        }

        Self {
            text: texts.join(" "),
            confidence: round3(mean),
            boxes,
            processing_time: round3(elapsed.as_secs_f64()),
            word_count: Some(count),
            error: None,
        }
    }

    pub fn no_text(elapsed: Duration) -> Self {
        Self::empty(NO_TEXT_DETECTED.to_string(), elapsed)
    }

    /// Result for an engine run that raised an error
    pub fn failed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self::empty(message.into(), elapsed)
    }

    fn empty(error: String, elapsed: Duration) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            boxes: Vec::new(),
            processing_time: round3(elapsed.as_secs_f64()),
            word_count: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Side-by-side numbers for the compare endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub paddle_confidence: f64,
    pub easy_confidence: f64,
    pub total_processing_time: f64,
}

/// Result of running both engines on the same image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub best_result: OcrResult,
    pub best_engine: EngineKind,
    pub paddle_result: OcrResult,
    pub easy_result: OcrResult,
    pub comparison: ComparisonSummary,
}

impl ComparisonResult {
    pub fn new(paddle_result: OcrResult, easy_result: OcrResult) -> Self {
        let best_engine = select_best(paddle_result.confidence, easy_result.confidence);
        let best_result = match best_engine {
            EngineKind::Paddle => paddle_result.clone(),
            EngineKind::Easy => easy_result.clone(),
        };

        let comparison = ComparisonSummary {
            paddle_confidence: paddle_result.confidence,
            easy_confidence: easy_result.confidence,
            total_processing_time: round3(
                paddle_result.processing_time + easy_result.processing_time,
            ),
        };

        Self {
            best_result,
            best_engine,
            paddle_result,
            easy_result,
            comparison,
        }
    }
}

/// Paddle wins only on a strictly higher confidence; ties go to easy
pub fn select_best(paddle_confidence: f64, easy_confidence: f64) -> EngineKind {
    if paddle_confidence > easy_confidence {
        EngineKind::Paddle
    } else {
        EngineKind::Easy
    }
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
