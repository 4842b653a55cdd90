// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction endpoint handlers

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::path::PathBuf;
use tracing::debug;

use super::response::{CompareResponse, ExtractResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::accept_upload;
use crate::storage::uploads::StoredUpload;
use crate::vision::ocr::EngineKind;

/// POST /api/v1/extract/paddle - Extract text using PaddleOCR
pub async fn extract_paddle_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    extract_with(state, multipart, EngineKind::Paddle).await
}

/// POST /api/v1/extract/easy - Extract text using EasyOCR
pub async fn extract_easy_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    extract_with(state, multipart, EngineKind::Easy).await
}

/// POST /api/v1/extract/compare - Run both engines and pick the more confident result
///
/// # Errors
/// - 400 Bad Request: missing, invalid or oversize file
/// - 503 Service Unavailable: either engine not loaded
/// - 500 Internal Server Error: storage or worker failure
pub async fn extract_compare_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CompareResponse>, ApiError> {
    let upload = accept_upload(&state, multipart).await?;
    let processed = preprocess(&state, &upload).await?;

    let comparison = state.ocr_service.compare(&processed).await?;
    Ok(Json(CompareResponse::new(comparison)))
}

async fn extract_with(
    state: AppState,
    multipart: Multipart,
    kind: EngineKind,
) -> Result<Json<ExtractResponse>, ApiError> {
    let upload = accept_upload(&state, multipart).await?;
    let processed = preprocess(&state, &upload).await?;

    let result = state.ocr_service.extract(&processed, kind).await?;
    Ok(Json(ExtractResponse::new(kind, result)))
}

/// Run the enhancement chain on the blocking pool
async fn preprocess(state: &AppState, upload: &StoredUpload) -> Result<PathBuf, ApiError> {
    let processor = state.image_processor.clone();
    let path = upload.path().to_path_buf();

    let processed = tokio::task::spawn_blocking(move || processor.preprocess_image(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("preprocessing task failed: {}", e)))?;

    debug!("OCR input for {}: {}", upload.id(), processed.display());
    Ok(processed)
}
