// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use smart_doc_verifier::{
    api::{start_server, AppState},
    cli::Cli,
    storage::UploadStore,
    vision::model_manager::OcrModelManager,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.load_config().context("Failed to load configuration")?;

    println!("🚀 Starting Smart Document Verifier...\n");
    println!("📁 Upload directory: {}", config.upload.upload_dir.display());
    println!("📏 Max upload size: {} bytes", config.upload.max_file_size);
    println!(
        "🖼️  Allowed extensions: {}",
        config.upload.allowed_extensions.join(", ")
    );
    println!();

    UploadStore::new(config.upload.upload_dir.clone())
        .ensure_dir()
        .await
        .context("Failed to create upload directory")?;

    println!("🧠 Loading OCR engines...");
    let manager = OcrModelManager::new(&config.engines).await;
    for engine in manager.list_engines() {
        let mark = if engine.available { "✅" } else { "⚠️ " };
        println!("   {} {} available: {}", mark, engine.name, engine.available);
    }
    println!();

    let state = AppState::new(config, manager.into_service());
    start_server(state).await
}
