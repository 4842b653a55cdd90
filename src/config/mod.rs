// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Single source of truth for the upload allow-list, the size cap, the upload
//! directory, model locations and inference concurrency. Values are layered:
//! built-in defaults, then an optional TOML file, then environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extra bytes allowed on top of the file cap for multipart framing
/// (boundaries, part headers).
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Default maximum upload size (10MB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Upload acceptance policy and scratch directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory where uploads and processed images live for the duration of a request
    pub upload_dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_file_size: usize,
    /// Accepted file extensions (lowercase, without the dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl UploadConfig {
    /// Request body limit enforced at the transport layer.
    ///
    /// Derived from the file cap so the two limits can never disagree.
    pub fn transport_limit(&self) -> usize {
        self.max_file_size + MULTIPART_OVERHEAD_BYTES
    }

    /// Check whether an extension (any case, no dot) is accepted
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Lowercase the allow-list and strip leading dots
    pub fn normalize_extensions(&mut self) {
        for extension in &mut self.allowed_extensions {
            *extension = extension.trim_start_matches('.').to_lowercase();
        }
    }
}

/// OCR engine model locations and inference limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory with det_model.onnx, rec_model.onnx and ppocr_keys_v1.txt
    pub paddle_model_dir: Option<PathBuf>,
    /// Directory with detector.onnx, recognizer.onnx and optional characters.txt
    pub easy_model_dir: Option<PathBuf>,
    /// Maximum number of engine runs executing at the same time
    pub max_concurrent_inferences: usize,
    /// ONNX Runtime intra-op threads per session
    pub intra_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            paddle_model_dir: Some(PathBuf::from("./models/paddleocr-onnx")),
            easy_model_dir: Some(PathBuf::from("./models/easyocr-onnx")),
            max_concurrent_inferences: 2,
            intra_threads: 4,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub engines: EngineConfig,
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and keys fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        config.upload.normalize_extensions();
        Ok(config)
    }

    /// Load defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from environment variables when they are set and parse
    pub fn apply_env(&mut self) {
        if let Ok(host) = env::var("DOC_VERIFIER_HOST") {
            self.server.host = host;
        }

        if let Some(port) = env::var("DOC_VERIFIER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        if let Ok(dir) = env::var("UPLOAD_FOLDER") {
            self.upload.upload_dir = PathBuf::from(dir);
        }

        if let Some(size) = env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.upload.max_file_size = size;
        }

        if let Ok(dir) = env::var("PADDLE_MODEL_DIR") {
            self.engines.paddle_model_dir = non_empty_path(dir);
        }

        if let Ok(dir) = env::var("EASY_MODEL_DIR") {
            self.engines.easy_model_dir = non_empty_path(dir);
        }

        if let Some(n) = env::var("MAX_CONCURRENT_INFERENCES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.engines.max_concurrent_inferences = n;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "upload.allowed_extensions must not be empty".to_string(),
            ));
        }

        if self.upload.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "upload.max_file_size must be greater than 0".to_string(),
            ));
        }

        if self.engines.max_concurrent_inferences == 0 {
            return Err(ConfigError::Invalid(
                "engines.max_concurrent_inferences must be greater than 0".to_string(),
            ));
        }

        if self.engines.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "engines.intra_threads must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address the HTTP server binds to
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "invalid listen address {}:{}: {}",
                    self.server.host, self.server.port, e
                ))
            })
    }
}

// An empty value disables the engine.
fn non_empty_path(value: String) -> Option<PathBuf> {
    if value.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
