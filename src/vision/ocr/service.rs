// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR service: runs engines off the async runtime and normalizes their output

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use super::engine::{EngineKind, OcrEngine};
use super::result::{ComparisonResult, OcrResult};
use crate::vision::image_utils::open_image;

#[derive(Debug, Error)]
pub enum OcrServiceError {
    #[error("{0} engine is not loaded")]
    EngineUnavailable(EngineKind),

    #[error("OCR worker failed: {0}")]
    Worker(String),
}

/// Shared entry point for both OCR engines
#[derive(Clone)]
pub struct OcrService {
    paddle: Option<Arc<dyn OcrEngine>>,
    easy: Option<Arc<dyn OcrEngine>>,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for OcrService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrService")
            .field("paddle", &self.paddle.is_some())
            .field("easy", &self.easy.is_some())
            .field("available_permits", &self.permits.available_permits())
            .finish()
    }
}

impl OcrService {
    /// `max_concurrent` bounds simultaneous engine runs (minimum 1)
    pub fn new(
        paddle: Option<Arc<dyn OcrEngine>>,
        easy: Option<Arc<dyn OcrEngine>>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            paddle,
            easy,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn engine(&self, kind: EngineKind) -> Option<&Arc<dyn OcrEngine>> {
        match kind {
            EngineKind::Paddle => self.paddle.as_ref(),
            EngineKind::Easy => self.easy.as_ref(),
        }
    }

    pub fn is_available(&self, kind: EngineKind) -> bool {
        self.engine(kind).is_some()
    }

    /// Both engines loaded
    pub fn is_fully_loaded(&self) -> bool {
        self.paddle.is_some() && self.easy.is_some()
    }

    /// Run one engine on an image file
    ///
    /// Engine failures are reported inside the result (`error` set), not as
    /// an `Err`. Only a missing engine or a crashed worker is an error.
    pub async fn extract(&self, image_path: &Path, kind: EngineKind) -> Result<OcrResult, OcrServiceError> {
        let engine = self
            .engine(kind)
            .cloned()
            .ok_or(OcrServiceError::EngineUnavailable(kind))?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| OcrServiceError::Worker(e.to_string()))?;

        let path: PathBuf = image_path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || run_engine(engine.as_ref(), &path))
            .await
            .map_err(|e| OcrServiceError::Worker(e.to_string()))?;

        info!(
            "{} OCR: {} fragments, confidence {:.3}, {:.3}s",
            kind.display_name(),
            result.word_count.unwrap_or(0),
            result.confidence,
            result.processing_time
        );
        Ok(result)
    }

    /// Run paddle then easy on the same image and pick the more confident result
    pub async fn compare(&self, image_path: &Path) -> Result<ComparisonResult, OcrServiceError> {
        for kind in [EngineKind::Paddle, EngineKind::Easy] {
            if !self.is_available(kind) {
                return Err(OcrServiceError::EngineUnavailable(kind));
            }
        }

        let paddle = self.extract(image_path, EngineKind::Paddle).await?;
        let easy = self.extract(image_path, EngineKind::Easy).await?;

        let comparison = ComparisonResult::new(paddle, easy);
        debug!("Comparison picked {}", comparison.best_engine);
        Ok(comparison)
    }
}

/// Blocking body of an engine run, timed from image load to last fragment
fn run_engine(engine: &dyn OcrEngine, path: &Path) -> OcrResult {
    let start = Instant::now();
    let label = engine.kind().display_name();

    let image = match open_image(path) {
        Ok(image) => image,
        Err(e) => {
            error!("{} error: {}", label, e);
            return OcrResult::failed(e.to_string(), start.elapsed());
        }
    };

    match engine.recognize(&image) {
        Ok(fragments) => OcrResult::from_fragments(fragments, start.elapsed()),
        Err(e) => {
            error!("{} error: {:#}", label, e);
            OcrResult::failed(e.to_string(), start.elapsed())
        }
    }
}
