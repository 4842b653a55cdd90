// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request upload scratch files
//!
//! Every accepted upload is written under a freshly generated UUID name, so
//! concurrent requests never share a path. The returned [`StoredUpload`]
//! deletes the upload and everything derived from it when dropped.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Suffix appended to the stem of preprocessed images
pub const PROCESSED_SUFFIX: &str = "_processed";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to create upload directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write upload {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Upload directory owner
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| UploadError::CreateDir {
                path: self.dir.display().to_string(),
                source,
            })
    }

    /// Write upload bytes to a request-scoped file
    pub async fn persist(&self, data: &[u8], extension: &str) -> Result<StoredUpload, UploadError> {
        self.ensure_dir().await?;

        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{}.{}", id, extension));

        // Register for cleanup before writing so a partial write is removed too
        let stored = StoredUpload {
            id,
            path: path.clone(),
            derived: vec![processed_path_for(&path)],
        };

        tokio::fs::write(&path, data)
            .await
            .map_err(|source| UploadError::Write {
                path: path.display().to_string(),
                source,
            })?;

        debug!("Stored upload {} ({} bytes)", path.display(), data.len());
        Ok(stored)
    }
}

/// Path of the preprocessed image derived from `path`
pub fn processed_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}.png", stem, PROCESSED_SUFFIX))
}

/// An upload on disk, removed together with its derived files on drop
#[derive(Debug)]
pub struct StoredUpload {
    id: Uuid,
    path: PathBuf,
    derived: Vec<PathBuf>,
}

impl StoredUpload {
    /// Request-scoped identifier used in the on-disk name
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the preprocessed image for this upload is written
    pub fn processed_path(&self) -> PathBuf {
        processed_path_for(&self.path)
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        // Drop cannot await; both files are small so a blocking unlink is fine
        for path in std::iter::once(&self.path).chain(self.derived.iter()) {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                // Best effort: a leftover file must not fail the request
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}
