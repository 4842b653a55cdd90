// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::vision::model_manager::EngineInfo;
use crate::vision::ocr::EngineKind;

pub const SERVICE_MESSAGE: &str = "Smart Document Verifier API v1.0";

/// Route descriptions listed by the health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointList {
    #[serde(rename = "POST /api/v1/extract/paddle")]
    pub extract_paddle: String,
    #[serde(rename = "POST /api/v1/extract/easy")]
    pub extract_easy: String,
    #[serde(rename = "POST /api/v1/extract/compare")]
    pub extract_compare: String,
    #[serde(rename = "POST /api/v1/analyze/quality")]
    pub analyze_quality: String,
}

impl Default for EndpointList {
    fn default() -> Self {
        Self {
            extract_paddle: "Extract text using PaddleOCR".to_string(),
            extract_easy: "Extract text using EasyOCR".to_string(),
            extract_compare: "Compare both OCR engines".to_string(),
            analyze_quality: "Analyze image quality".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" with both engines loaded, "degraded" otherwise
    pub status: String,
    pub message: String,
    pub endpoints: EndpointList,
    pub engines: Vec<EngineInfo>,
}

/// GET / - service status and route list
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let service = &state.ocr_service;
    let engines = [EngineKind::Paddle, EngineKind::Easy]
        .into_iter()
        .map(|kind| EngineInfo::new(kind, service.is_available(kind)))
        .collect();

    let status = if service.is_fully_loaded() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: SERVICE_MESSAGE.to_string(),
        endpoints: EndpointList::default(),
        engines,
    })
}
