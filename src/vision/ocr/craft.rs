// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CRAFT text detection (EasyOCR detector)
//!
//! The network predicts a region score and an affinity (link) score at half
//! the input resolution. Characters are grouped into word boxes by labelling
//! the union of both maps, and word boxes are then merged into text lines.

use anyhow::Result;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::{Array4, ArrayViewD, IxDyn};
use std::path::Path;
use tracing::debug;

use super::components::{label, Connectivity};
use super::preprocessing::{write_rgb, Normalization};
use super::session::OnnxModel;

/// Longest side the input is allowed to reach
pub const CANVAS_SIZE: u32 = 2560;

/// Network stride: input dimensions are padded to a multiple of this
pub const SIZE_MULTIPLE: u32 = 32;

/// Score map thresholds and line grouping parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftParams {
    /// Minimum peak region score for a word
    pub text_threshold: f32,
    /// Affinity score threshold
    pub link_threshold: f32,
    /// Region score threshold for the labelling mask
    pub low_text: f32,
    /// Minimum component size in score-map pixels
    pub min_size: usize,
    /// Max vertical centre offset for two boxes on one line, relative to height
    pub ycenter_ths: f32,
    /// Max height difference for two boxes on one line, relative to height
    pub height_ths: f32,
    /// Max horizontal gap to merge neighbours, relative to height
    pub width_ths: f32,
    /// Margin added around merged boxes, relative to height
    pub add_margin: f32,
}

impl Default for CraftParams {
    fn default() -> Self {
        Self {
            text_threshold: 0.7,
            link_threshold: 0.4,
            low_text: 0.4,
            min_size: 10,
            ycenter_ths: 0.5,
            height_ths: 0.5,
            width_ths: 0.5,
            add_margin: 0.1,
        }
    }
}

/// Axis-aligned box in original image pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl WordBox {
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn y_center(&self) -> f32 {
        (self.y_min + self.y_max) / 2.0
    }
}

/// Input tensor plus the factor mapping score-map pixels back to the image
#[derive(Debug, Clone)]
pub struct CraftInput {
    pub tensor: Array4<f32>,
    /// Original pixels per resized-input pixel
    pub inverse_ratio: f32,
}

/// CRAFT detection model (CPU-only)
#[derive(Debug, Clone)]
pub struct CraftDetector {
    model: OnnxModel,
    params: CraftParams,
}

impl CraftDetector {
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model = OnnxModel::load(model_path.as_ref(), "EasyOCR detection", intra_threads)?;
        Ok(Self {
            model,
            params: CraftParams::default(),
        })
    }

    /// Detect text lines, returned top-to-bottom in original image coordinates
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<WordBox>> {
        let input = prepare_input(image);
        let output = self.model.run(&input.tensor)?;

        let (text_map, link_map, width, height) = split_score_maps(output.view())?;
        let words = word_boxes(&text_map, &link_map, width, height, &self.params);

        // Score maps are at half the network input resolution
        let scale = 2.0 * input.inverse_ratio;
        let (img_w, img_h) = image.dimensions();
        let words: Vec<WordBox> = words
            .into_iter()
            .map(|b| WordBox {
                x_min: b.x_min * scale,
                x_max: (b.x_max * scale).min(img_w as f32),
                y_min: b.y_min * scale,
                y_max: (b.y_max * scale).min(img_h as f32),
            })
            .collect();

        let lines = group_into_lines(words, &self.params, img_w as f32, img_h as f32);
        debug!("CRAFT found {} text lines", lines.len());
        Ok(lines)
    }
}

/// Resize (longest side capped at the canvas), pad to a multiple of 32 and normalize
pub fn prepare_input(image: &DynamicImage) -> CraftInput {
    let (w, h) = image.dimensions();
    let longest = w.max(h).max(1);
    let target = longest.min(CANVAS_SIZE);
    let ratio = target as f32 / longest as f32;

    let target_w = ((w as f32 * ratio) as u32).max(1);
    let target_h = ((h as f32 * ratio) as u32).max(1);
    let resized = image
        .resize_exact(target_w, target_h, FilterType::Triangle)
        .to_rgb8();

    let padded_w = round_up(target_w, SIZE_MULTIPLE) as usize;
    let padded_h = round_up(target_h, SIZE_MULTIPLE) as usize;

    // Padding stays zero like the network's training pipeline
    let mut tensor = Array4::zeros((1, 3, padded_h, padded_w));
    write_rgb(&mut tensor, &resized, Normalization::IMAGENET);

    CraftInput {
        tensor,
        inverse_ratio: 1.0 / ratio,
    }
}

fn round_up(value: u32, multiple: u32) -> u32 {
    value.div_ceil(multiple) * multiple
}

/// Split a `[1, H, W, 2]` output into row-major region and link maps
pub fn split_score_maps(output: ArrayViewD<f32>) -> Result<(Vec<f32>, Vec<f32>, usize, usize)> {
    let shape = output.shape();
    if shape.len() != 4 || shape[3] != 2 {
        anyhow::bail!("Unexpected CRAFT output shape: {:?}, expected [1, H, W, 2]", shape);
    }
    let (height, width) = (shape[1], shape[2]);

    let mut text = Vec::with_capacity(width * height);
    let mut link = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            text.push(output[IxDyn(&[0, y, x, 0])]);
            link.push(output[IxDyn(&[0, y, x, 1])]);
        }
    }
    Ok((text, link, width, height))
}

/// Word boxes in score-map coordinates
pub fn word_boxes(
    text_map: &[f32],
    link_map: &[f32],
    width: usize,
    height: usize,
    params: &CraftParams,
) -> Vec<WordBox> {
    let text_mask: Vec<bool> = text_map.iter().map(|&v| v > params.low_text).collect();
    let link_mask: Vec<bool> = link_map.iter().map(|&v| v > params.link_threshold).collect();
    let combined: Vec<bool> = text_mask
        .iter()
        .zip(&link_mask)
        .map(|(&t, &l)| t || l)
        .collect();

    let mut boxes = Vec::new();
    for region in label(&combined, width, height, Connectivity::Eight) {
        if region.size() < params.min_size {
            continue;
        }

        let peak = region
            .pixels
            .iter()
            .map(|&(x, y)| text_map[y * width + x])
            .fold(f32::NEG_INFINITY, f32::max);
        if peak < params.text_threshold {
            continue;
        }

        // Pure link pixels only join characters, they are not part of the word
        let core: Vec<(usize, usize)> = region
            .pixels
            .iter()
            .copied()
            .filter(|&(x, y)| {
                let idx = y * width + x;
                !(link_mask[idx] && !text_mask[idx])
            })
            .collect();
        if core.is_empty() {
            continue;
        }

        let (w, h) = (region.width() as f32, region.height() as f32);
        let niter = ((region.size() as f32 * w.min(h) / (w * h)).sqrt() * 2.0) as usize;

        let (mut x_min, mut x_max, mut y_min, mut y_max) = (usize::MAX, 0, usize::MAX, 0);
        for &(x, y) in &core {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        // Dilation by a (1 + niter) square grows the extent by niter
        boxes.push(WordBox {
            x_min: x_min.saturating_sub(niter) as f32,
            x_max: (x_max + niter + 1).min(width) as f32,
            y_min: y_min.saturating_sub(niter) as f32,
            y_max: (y_max + niter + 1).min(height) as f32,
        });
    }

    boxes
}

/// Merge word boxes that sit on the same line into line boxes with a margin
///
/// Lines are returned top-to-bottom, boxes within a line left-to-right.
pub fn group_into_lines(
    mut boxes: Vec<WordBox>,
    params: &CraftParams,
    img_w: f32,
    img_h: f32,
) -> Vec<WordBox> {
    boxes.sort_by(|a, b| a.y_center().total_cmp(&b.y_center()));

    let mut lines: Vec<Vec<WordBox>> = Vec::new();
    for word in boxes {
        let joined = lines.last_mut().and_then(|line| {
            let mean_height = line.iter().map(WordBox::height).sum::<f32>() / line.len() as f32;
            let mean_center = line.iter().map(WordBox::y_center).sum::<f32>() / line.len() as f32;
            let same_height = (mean_height - word.height()).abs() < params.height_ths * mean_height;
            let same_row = (mean_center - word.y_center()).abs() < params.ycenter_ths * mean_height;
            (same_height && same_row).then_some(line)
        });

        match joined {
            Some(line) => line.push(word),
            None => lines.push(vec![word]),
        }
    }

    let mut merged = Vec::new();
    for mut line in lines {
        line.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));

        let mut segments: Vec<Vec<WordBox>> = Vec::new();
        for word in line {
            let joined = segments.last_mut().and_then(|segment| {
                let last = segment.last()?;
                let mean_height =
                    segment.iter().map(WordBox::height).sum::<f32>() / segment.len() as f32;
                let close = word.x_min - last.x_max < params.width_ths * mean_height;
                close.then_some(segment)
            });
            match joined {
                Some(segment) => segment.push(word),
                None => segments.push(vec![word]),
            }
        }

        for segment in segments {
            let x_min = segment.iter().map(|b| b.x_min).fold(f32::INFINITY, f32::min);
            let x_max = segment.iter().map(|b| b.x_max).fold(f32::NEG_INFINITY, f32::max);
            let y_min = segment.iter().map(|b| b.y_min).fold(f32::INFINITY, f32::min);
            let y_max = segment.iter().map(|b| b.y_max).fold(f32::NEG_INFINITY, f32::max);
            let margin = params.add_margin * (y_max - y_min);

            merged.push(WordBox {
                x_min: (x_min - margin).max(0.0),
                x_max: (x_max + margin).min(img_w),
                y_min: (y_min - margin).max(0.0),
                y_max: (y_max + margin).min(img_h),
            });
        }
    }

    merged
}
