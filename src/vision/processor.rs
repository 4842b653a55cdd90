// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! File-level image processing used by the HTTP handlers

use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::enhance::enhance_document;
use super::image_utils::{open_image, to_gray, ImageError};
use super::quality::{analyze, QualityMetrics};
use crate::config::UploadConfig;
use crate::storage::uploads::processed_path_for;
use crate::utils::validators::file_extension;

#[derive(Debug, Error)]
pub enum ImageProcessError {
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Applies the enhancement chain and quality analysis to image files
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    supported_extensions: Vec<String>,
}

impl ImageProcessor {
    /// Build a processor that accepts the same extensions as the upload policy
    pub fn new(policy: &UploadConfig) -> Self {
        Self {
            supported_extensions: policy
                .allowed_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Enhance an image file for OCR
    ///
    /// Writes `<stem>_processed.png` next to the input and returns its path.
    /// Never fails: on any error the original path is returned unchanged.
    pub fn preprocess_image(&self, image_path: &Path) -> PathBuf {
        match self.try_preprocess(image_path) {
            Ok(processed) => {
                debug!(
                    "Preprocessed {} -> {}",
                    image_path.display(),
                    processed.display()
                );
                processed
            }
            Err(e) => {
                error!("Image preprocessing error for {}: {}", image_path.display(), e);
                image_path.to_path_buf()
            }
        }
    }

    fn try_preprocess(&self, image_path: &Path) -> Result<PathBuf, ImageProcessError> {
        self.check_extension(image_path)?;

        let image = open_image(image_path)?;
        let processed = enhance_document(&image);

        let output = processed_path_for(image_path);
        processed
            .save_with_format(&output, ImageFormat::Png)
            .map_err(ImageError::Encode)?;

        Ok(output)
    }

    /// Analyze image quality for OCR suitability
    pub fn quality_metrics(&self, image_path: &Path) -> Result<QualityMetrics, ImageProcessError> {
        self.check_extension(image_path)?;

        let image = open_image(image_path)?;
        let metrics = analyze(&to_gray(&image));
        debug!(
            "Quality of {}: blur={} brightness={} contrast={} -> {}",
            image_path.display(),
            metrics.blur_score,
            metrics.brightness,
            metrics.contrast,
            metrics.quality_assessment
        );
        Ok(metrics)
    }

    fn check_extension(&self, image_path: &Path) -> Result<(), ImageProcessError> {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file_extension(&name).unwrap_or_default();

        if self.supported_extensions.iter().any(|e| *e == extension) {
            Ok(())
        } else {
            warn!("Refusing to process {}: unsupported extension", name);
            Err(ImageProcessError::UnsupportedExtension(extension))
        }
    }
}
