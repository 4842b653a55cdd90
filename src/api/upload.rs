// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload intake shared by every POST route

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::storage::uploads::StoredUpload;
use crate::utils::validators::{check_upload, file_extension, sanitize_filename};

/// Name of the multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// An uploaded file held in memory, not yet validated
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub data: Bytes,
}

/// Pull the `file` field out of the form, ignoring any other fields
pub async fn read_file_field(mut multipart: Multipart) -> Result<IncomingFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(IncomingFile { filename, data });
    }

    Err(ApiError::MissingFile)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::OversizeFile(err.body_text())
    } else {
        ApiError::MalformedUpload(err.body_text())
    }
}

/// Validate the upload in memory, then write it to a request-scoped file
///
/// Nothing touches disk unless every validation rule passes.
pub async fn accept_upload(state: &AppState, multipart: Multipart) -> Result<StoredUpload, ApiError> {
    let incoming = read_file_field(multipart).await?;
    let policy = &state.config.upload;

    check_upload(&incoming.filename, &incoming.data, policy)?;

    let extension = file_extension(&incoming.filename).unwrap_or_default();
    let stored = state.upload_store.persist(&incoming.data, &extension).await?;

    debug!(
        "Accepted upload '{}' ({} bytes) as {}",
        sanitize_filename(&incoming.filename),
        incoming.data.len(),
        stored.id()
    );
    Ok(stored)
}
