// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR model manager: loads both engines from their model directories

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::vision::ocr::{EasyOcrEngine, EngineKind, OcrEngine, OcrService, PaddleOcrEngine};

/// Information about an OCR engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineInfo {
    pub name: String,
    pub engine: EngineKind,
    pub available: bool,
}

impl EngineInfo {
    pub fn new(kind: EngineKind, available: bool) -> Self {
        Self {
            name: kind.display_name().to_string(),
            engine: kind,
            available,
        }
    }
}

/// Loaded OCR engines
///
/// Missing model directories are handled gracefully: the engine stays
/// unloaded and requests for it are answered with 503.
pub struct OcrModelManager {
    paddle: Option<Arc<dyn OcrEngine>>,
    easy: Option<Arc<dyn OcrEngine>>,
    max_concurrent_inferences: usize,
}

impl OcrModelManager {
    /// Load every engine that has a configured model directory
    pub async fn new(config: &EngineConfig) -> Self {
        let threads = config.intra_threads;

        let paddle = load_engine(config.paddle_model_dir.clone(), EngineKind::Paddle, move |dir| {
            PaddleOcrEngine::load(dir, threads).map(|e| Arc::new(e) as Arc<dyn OcrEngine>)
        })
        .await;

        let easy = load_engine(config.easy_model_dir.clone(), EngineKind::Easy, move |dir| {
            EasyOcrEngine::load(dir, threads).map(|e| Arc::new(e) as Arc<dyn OcrEngine>)
        })
        .await;

        Self {
            paddle,
            easy,
            max_concurrent_inferences: config.max_concurrent_inferences,
        }
    }

    /// Build a manager from already constructed engines
    pub fn from_engines(
        paddle: Option<Arc<dyn OcrEngine>>,
        easy: Option<Arc<dyn OcrEngine>>,
        max_concurrent_inferences: usize,
    ) -> Self {
        Self {
            paddle,
            easy,
            max_concurrent_inferences,
        }
    }

    pub fn has_engine(&self, kind: EngineKind) -> bool {
        match kind {
            EngineKind::Paddle => self.paddle.is_some(),
            EngineKind::Easy => self.easy.is_some(),
        }
    }

    /// List both engines with their availability
    pub fn list_engines(&self) -> Vec<EngineInfo> {
        [EngineKind::Paddle, EngineKind::Easy]
            .into_iter()
            .map(|kind| EngineInfo::new(kind, self.has_engine(kind)))
            .collect()
    }

    pub fn into_service(self) -> OcrService {
        OcrService::new(self.paddle, self.easy, self.max_concurrent_inferences)
    }
}

/// Model loading blocks on file IO and graph optimization, so it runs on the blocking pool
async fn load_engine<F>(
    dir: Option<PathBuf>,
    kind: EngineKind,
    load: F,
) -> Option<Arc<dyn OcrEngine>>
where
    F: FnOnce(PathBuf) -> anyhow::Result<Arc<dyn OcrEngine>> + Send + 'static,
{
    let Some(dir) = dir else {
        tracing::info!("{} disabled (no model directory configured)", kind.display_name());
        return None;
    };

    let dir_display = dir.display().to_string();
    match tokio::task::spawn_blocking(move || load(dir)).await {
        Ok(Ok(engine)) => {
            tracing::info!("✅ {} loaded from {}", kind.display_name(), dir_display);
            Some(engine)
        }
        Ok(Err(e)) => {
            tracing::warn!(
                "⚠️ Failed to load {} from {}: {:#}",
                kind.display_name(),
                dir_display,
                e
            );
            None
        }
        Err(e) => {
            tracing::warn!("⚠️ {} loader task failed: {}", kind.display_name(), e);
            None
        }
    }
}
