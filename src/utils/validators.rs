// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload validation
//!
//! All checks run on the in-memory upload, before anything touches disk.

use std::path::Path;
use thiserror::Error;

use crate::config::UploadConfig;
use crate::vision::image_utils::{detect_format, extension_aliases};

/// Why an upload was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("filename is empty")]
    EmptyFilename,

    #[error("extension '{0}' is not allowed")]
    ExtensionNotAllowed(String),

    #[error("file is {size} bytes, maximum is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("file content is not an allowed image format")]
    ContentNotAllowed,
}

/// Return the lowercase extension after the last dot, if any
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Check if the filename carries an allowed extension
pub fn allowed_file(filename: &str, policy: &UploadConfig) -> bool {
    file_extension(filename)
        .map(|ext| policy.allows_extension(&ext))
        .unwrap_or(false)
}

/// Validate an upload, reporting the first rule it breaks
pub fn check_upload(
    filename: &str,
    data: &[u8],
    policy: &UploadConfig,
) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if !allowed_file(filename, policy) {
        return Err(ValidationError::ExtensionNotAllowed(
            file_extension(filename).unwrap_or_default(),
        ));
    }

    if data.len() > policy.max_file_size {
        return Err(ValidationError::TooLarge {
            size: data.len(),
            max: policy.max_file_size,
        });
    }

    let format = detect_format(data).map_err(|_| ValidationError::ContentNotAllowed)?;
    if !extension_aliases(format)
        .iter()
        .any(|ext| policy.allows_extension(ext))
    {
        return Err(ValidationError::ContentNotAllowed);
    }

    Ok(())
}

/// Boolean form of [`check_upload`]
pub fn is_valid_upload(filename: &str, data: &[u8], policy: &UploadConfig) -> bool {
    check_upload(filename, data, policy).is_ok()
}

/// Clean a client-supplied filename for display in logs
///
/// Drops any path components and replaces spaces with underscores.
pub fn sanitize_filename(filename: &str) -> String {
    // Treat both separators as path separators regardless of platform
    let normalized = filename.replace('\\', "/");
    let base = Path::new(&normalized)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    base.replace(' ', "_")
}
