// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! The DB (Differentiable Binarization) detector outputs a per-pixel text
//! probability map. Post-processing thresholds the map, groups pixels into
//! connected regions, scores each region and expands ("unclips") its box.

use anyhow::Result;
use image::DynamicImage;
use ndarray::{ArrayViewD, IxDyn};
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

use super::components::{label, Connectivity};
use super::engine::{rect_polygon, Polygon};
use super::preprocessing::{detection_tensor, Letterbox};
use super::session::OnnxModel;

/// DB post-processing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbParams {
    /// Pixel probability threshold for the binary text mask
    pub threshold: f32,
    /// Minimum mean probability of a region to keep its box
    pub box_threshold: f32,
    /// Box expansion ratio (area * ratio / perimeter)
    pub unclip_ratio: f32,
    /// Minimum region size in pixels
    pub min_size: usize,
}

impl Default for DbParams {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            box_threshold: 0.6,
            unclip_ratio: 1.5,
            min_size: 10,
        }
    }
}

/// A detected text box with location and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean region probability (0.0-1.0)
    pub confidence: f32,
}

impl TextBox {
    /// Check if this text box is valid (reasonable dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.confidence > 0.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn to_polygon(&self) -> Polygon {
        rect_polygon(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Map a box from letterboxed model space back to the original image
    pub fn to_original(&self, letterbox: &Letterbox) -> TextBox {
        let (x0, y0) = letterbox.to_original(self.x, self.y);
        let (x1, y1) = letterbox.to_original(self.x + self.width, self.y + self.height);
        TextBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            confidence: self.confidence,
        }
    }
}

/// PaddleOCR text detection model (CPU-only)
#[derive(Debug, Clone)]
pub struct OcrDetectionModel {
    model: OnnxModel,
    params: DbParams,
}

impl OcrDetectionModel {
    /// Load the detection model (det_model.onnx)
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model = OnnxModel::load(model_path.as_ref(), "PaddleOCR detection", intra_threads)?;
        Ok(Self {
            model,
            params: DbParams::default(),
        })
    }

    pub fn with_params(mut self, params: DbParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> DbParams {
        self.params
    }

    /// Detect text boxes, returned in original image coordinates and reading order
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<TextBox>> {
        let (input, letterbox) = detection_tensor(image);
        let output = self.model.run(&input)?;

        let boxes = boxes_from_probability_map(output.view(), &self.params)?
            .into_iter()
            .map(|b| b.to_original(&letterbox))
            .filter(TextBox::is_valid)
            .collect::<Vec<_>>();

        debug!("Detected {} text regions", boxes.len());
        Ok(boxes)
    }
}

/// Turn a `[1, 1, H, W]` or `[1, H, W]` probability map into text boxes
///
/// Boxes are in probability-map coordinates, sorted top-to-bottom then
/// left-to-right.
pub fn boxes_from_probability_map(map: ArrayViewD<f32>, params: &DbParams) -> Result<Vec<TextBox>> {
    let shape = map.shape().to_vec();
    let (height, width) = match shape.len() {
        4 => (shape[2], shape[3]),
        3 => (shape[1], shape[2]),
        _ => anyhow::bail!("Unexpected detection output shape: {:?}", shape),
    };

    let mut probs = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let p = if shape.len() == 4 {
                map[IxDyn(&[0, 0, y, x])]
            } else {
                map[IxDyn(&[0, y, x])]
            };
            probs.push(p);
        }
    }

    let mask: Vec<bool> = probs.iter().map(|&p| p > params.threshold).collect();

    let mut boxes = Vec::new();
    for region in label(&mask, width, height, Connectivity::Four) {
        if region.size() < params.min_size {
            continue;
        }

        let score = region.mean_of(&probs, width);
        if score < params.box_threshold {
            continue;
        }

        let (x, y) = (region.min_x as f32, region.min_y as f32);
        let (w, h) = (region.width() as f32, region.height() as f32);
        let distance = unclip_distance(w, h, params.unclip_ratio);

        let x0 = (x - distance).max(0.0);
        let y0 = (y - distance).max(0.0);
        let x1 = (x + w + distance).min(width as f32);
        let y1 = (y + h + distance).min(height as f32);

        boxes.push(TextBox {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            confidence: score,
        });
    }

    sort_reading_order(&mut boxes);
    Ok(boxes)
}

/// Offset distance used to grow a `w` x `h` rectangle
fn unclip_distance(w: f32, h: f32, ratio: f32) -> f32 {
    let perimeter = 2.0 * (w + h);
    if perimeter <= 0.0 {
        0.0
    } else {
        w * h * ratio / perimeter
    }
}

/// Sort by y-position (top to bottom), then x-position (left to right)
pub fn sort_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| match a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
        other => other,
    });
}
