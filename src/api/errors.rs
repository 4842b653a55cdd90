// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use crate::storage::uploads::UploadError;
use crate::utils::validators::ValidationError;
use crate::vision::ocr::{EngineKind, OcrServiceError};
use crate::vision::processor::ImageProcessError;

/// JSON body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_type: String,
}

/// Request failure kinds
///
/// The `String` payloads carry detail for the server log only; clients see
/// a fixed message per kind.
#[derive(Debug, Clone)]
pub enum ApiError {
    MissingFile,
    InvalidFormat(String),
    OversizeFile(String),
    MalformedUpload(String),
    EngineUnavailable(EngineKind),
    Internal(String),
}

impl ApiError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::MissingFile => "missing_file",
            ApiError::InvalidFormat(_) => "invalid_format",
            ApiError::OversizeFile(_) => "oversize_file",
            ApiError::MalformedUpload(_) => "malformed_upload",
            ApiError::EngineUnavailable(_) => "engine_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::MissingFile => "No file provided".to_string(),
            ApiError::InvalidFormat(_) => "Invalid file format".to_string(),
            ApiError::OversizeFile(_) => "File too large".to_string(),
            ApiError::MalformedUpload(_) => "Malformed multipart upload".to_string(),
            ApiError::EngineUnavailable(kind) => {
                format!("{} engine is not available", kind.display_name())
            }
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.public_message(),
            error_type: self.error_type().to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::InvalidFormat(_)
            | ApiError::OversizeFile(_)
            | ApiError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingFile => write!(f, "No file part named 'file'"),
            ApiError::InvalidFormat(detail) => write!(f, "Invalid file format: {}", detail),
            ApiError::OversizeFile(detail) => write!(f, "File too large: {}", detail),
            ApiError::MalformedUpload(detail) => write!(f, "Malformed upload: {}", detail),
            ApiError::EngineUnavailable(kind) => {
                write!(f, "{} engine not loaded", kind.display_name())
            }
            ApiError::Internal(detail) => write!(f, "Internal error: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            too_large @ ValidationError::TooLarge { .. } => {
                ApiError::OversizeFile(too_large.to_string())
            }
            other => ApiError::InvalidFormat(other.to_string()),
        }
    }
}

impl From<OcrServiceError> for ApiError {
    fn from(err: OcrServiceError) -> Self {
        match err {
            OcrServiceError::EngineUnavailable(kind) => ApiError::EngineUnavailable(kind),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ImageProcessError> for ApiError {
    fn from(err: ImageProcessError) -> Self {
        ApiError::InvalidFormat(err.to_string())
    }
}
