// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Quality analysis handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::info;

use super::response::QualityResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::accept_upload;

/// POST /api/v1/analyze/quality - Analyze image quality for OCR suitability
///
/// Works on the upload as received; no preprocessing is applied.
///
/// # Errors
/// - 400 Bad Request: missing, invalid, oversize or undecodable file
/// - 500 Internal Server Error: storage or worker failure
pub async fn quality_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<QualityResponse>, ApiError> {
    let upload = accept_upload(&state, multipart).await?;

    let processor = state.image_processor.clone();
    let path = upload.path().to_path_buf();
    let metrics = tokio::task::spawn_blocking(move || processor.quality_metrics(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("quality task failed: {}", e)))??;

    info!(
        "Quality analysis for {}: {} ({})",
        upload.id(),
        metrics.quality_assessment,
        metrics.resolution
    );
    Ok(Json(QualityResponse::new(metrics)))
}
