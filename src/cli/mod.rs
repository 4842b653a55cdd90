// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, ServiceConfig};

/// Smart Document Verifier
#[derive(Parser, Debug, Default)]
#[command(name = "smart-doc-verifier")]
#[command(version = "1.0.0")]
#[command(about = "Document image preprocessing and OCR extraction over HTTP", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "DOC_VERIFIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen host, overrides the config file and environment
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port, overrides the config file and environment
    #[arg(short, long)]
    pub port: Option<u16>,

    /// PaddleOCR model directory
    #[arg(long)]
    pub paddle_model_dir: Option<PathBuf>,

    /// EasyOCR model directory
    #[arg(long)]
    pub easy_model_dir: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective configuration
    ///
    /// Precedence, lowest first: defaults, config file, environment, flags.
    pub fn load_config(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        config.apply_env();
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.paddle_model_dir {
            config.engines.paddle_model_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.easy_model_dir {
            config.engines.easy_model_dir = Some(dir.clone());
        }
    }
}
