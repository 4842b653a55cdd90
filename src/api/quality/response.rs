// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::vision::quality::QualityMetrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResponse {
    pub success: bool,
    pub quality_analysis: QualityMetrics,
}

impl QualityResponse {
    pub fn new(quality_analysis: QualityMetrics) -> Self {
        Self {
            success: true,
            quality_analysis,
        }
    }
}
