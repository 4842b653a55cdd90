// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction response types

use serde::{Deserialize, Serialize};

use crate::vision::ocr::{ComparisonResult, EngineKind, OcrResult};

/// Response of a single-engine extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    /// "PaddleOCR" or "EasyOCR"
    pub engine: String,
    pub result: OcrResult,
}

impl ExtractResponse {
    pub fn new(kind: EngineKind, result: OcrResult) -> Self {
        Self {
            success: true,
            engine: kind.display_name().to_string(),
            result,
        }
    }
}

/// Response of the compare endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub success: bool,
    pub comparison: ComparisonResult,
}

impl CompareResponse {
    pub fn new(comparison: ComparisonResult) -> Self {
        Self {
            success: true,
            comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_extract_response_shape() {
        let response = ExtractResponse::new(EngineKind::Easy, OcrResult::no_text(Duration::ZERO));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["engine"], "EasyOCR");
        assert_eq!(json["result"]["error"], "No text detected");
    }
}
