// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared ONNX Runtime session handling for the OCR models

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A CPU-only ONNX model with a single image input
#[derive(Clone)]
pub struct OnnxModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    label: &'static str,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("label", &self.label)
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Load a model file
    ///
    /// `label` names the model in logs and errors (e.g. "PaddleOCR detection").
    pub fn load(model_path: &Path, label: &'static str, intra_threads: usize) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("{} model not found: {}", label, model_path.display());
        }

        info!("Loading {} model from {}", label, model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads.max(1))
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load {} model from {}",
                label,
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("{} model input {}: {:?}", label, input_name, input.input_type);
        }

        info!("✅ {} model loaded (CPU-only)", label);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            label,
        })
    }

    /// Run the model and return its first output as an owned array
    pub fn run(&self, input: &Array4<f32>) -> Result<ArrayD<f32>> {
        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("{} session lock poisoned", self.label))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context(format!("{} inference failed", self.label))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("{} output shape: {:?}", self.label, output.shape());
        Ok(output.to_owned())
    }
}
