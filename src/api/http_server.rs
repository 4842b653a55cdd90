// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::extract::{extract_compare_handler, extract_easy_handler, extract_paddle_handler};
use super::handlers::health_handler;
use super::quality::quality_handler;
use crate::config::ServiceConfig;
use crate::storage::uploads::UploadStore;
use crate::vision::ocr::OcrService;
use crate::vision::processor::ImageProcessor;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub ocr_service: OcrService,
    pub image_processor: ImageProcessor,
    pub upload_store: UploadStore,
}

impl AppState {
    /// Build state whose processor and upload store follow `config.upload`
    pub fn new(config: ServiceConfig, ocr_service: OcrService) -> Self {
        let image_processor = ImageProcessor::new(&config.upload);
        let upload_store = UploadStore::new(config.upload.upload_dir.clone());
        Self {
            config: Arc::new(config),
            ocr_service,
            image_processor,
            upload_store,
        }
    }
}

/// Route table
///
/// The transport limit sits just above the validator's size cap so an
/// oversize file is still read and rejected with a clean 400.
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.upload.transport_limit();

    Router::new()
        .route("/", get(health_handler))
        .route("/api/v1/extract/paddle", post(extract_paddle_handler))
        .route("/api/v1/extract/easy", post(extract_easy_handler))
        .route("/api/v1/extract/compare", post(extract_compare_handler))
        .route("/api/v1/analyze/quality", post(quality_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr()?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
