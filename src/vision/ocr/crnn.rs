// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CRNN text recognition (EasyOCR recognizer)

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage};
use ndarray::Array4;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::ctc::{greedy_decode, softmax_last_axis};
use super::session::OnnxModel;

/// Recognizer input height
pub const CRNN_INPUT_HEIGHT: u32 = 64;

/// Character set of the English EasyOCR model, in class order after the blank
pub const DEFAULT_CHARSET: &str =
    "0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ €ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Text recognized in one crop
#[derive(Debug, Clone, PartialEq)]
pub struct CrnnOutput {
    pub text: String,
    pub confidence: f32,
}

/// CRNN recognition model (CPU-only)
#[derive(Clone)]
pub struct CrnnRecognizer {
    model: OnnxModel,
    /// Class labels, blank at index 0
    charset: Arc<Vec<char>>,
}

impl std::fmt::Debug for CrnnRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrnnRecognizer")
            .field("charset_size", &self.charset.len())
            .finish_non_exhaustive()
    }
}

impl CrnnRecognizer {
    /// Load the recognizer; `charset_path` overrides the built-in English charset when present
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        charset_path: Option<&Path>,
        intra_threads: usize,
    ) -> Result<Self> {
        let characters = match charset_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .context(format!("Failed to read charset {}", path.display()))?;
                info!("Using charset from {}", path.display());
                parse_charset(&content)
            }
            _ => parse_charset(DEFAULT_CHARSET),
        };
        if characters.is_empty() {
            anyhow::bail!("EasyOCR charset is empty");
        }

        let model = OnnxModel::load(model_path.as_ref(), "EasyOCR recognition", intra_threads)?;

        let mut charset = Vec::with_capacity(characters.len() + 1);
        charset.push('\0');
        charset.extend(characters);

        Ok(Self {
            model,
            charset: Arc::new(charset),
        })
    }

    pub fn charset_size(&self) -> usize {
        self.charset.len()
    }

    pub fn recognize(&self, crop: &DynamicImage) -> Result<CrnnOutput> {
        let input = preprocess_crop(crop);
        let mut logits = self.model.run(&input)?;
        softmax_last_axis(&mut logits);

        let decoded = greedy_decode(logits.view(), &self.charset)?;
        let confidence = custom_mean(&decoded.non_blank_scores);
        debug!("CRNN recognized '{}' ({:.3})", decoded.text, confidence);

        Ok(CrnnOutput {
            text: decoded.text,
            confidence,
        })
    }
}

/// Characters of a charset file, ignoring line breaks
pub fn parse_charset(content: &str) -> Vec<char> {
    content.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// `prod(p) ^ (2 / sqrt(n))`, or 0 for an empty input
pub fn custom_mean(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    let product: f64 = scores.iter().map(|&p| p as f64).product();
    product.powf(2.0 / (scores.len() as f64).sqrt()) as f32
}

/// Grayscale, resize to height 64 and replicate-pad the width
///
/// The padded width is `ceil(w / h) * 64`, so the resized crop always fits.
pub fn preprocess_crop(crop: &DynamicImage) -> Array4<f32> {
    let (w, h) = crop.dimensions();
    let (w, h) = (w.max(1), h.max(1));
    let ratio = w as f32 / h as f32;

    let padded_w = (ratio.ceil() as u32).max(1) * CRNN_INPUT_HEIGHT;
    let resized_w = ((CRNN_INPUT_HEIGHT as f32 * ratio).ceil() as u32).clamp(1, padded_w);

    let gray: GrayImage = crop
        .resize_exact(resized_w, CRNN_INPUT_HEIGHT, FilterType::CatmullRom)
        .to_luma8();

    let height = CRNN_INPUT_HEIGHT as usize;
    let mut tensor = Array4::zeros((1, 1, height, padded_w as usize));
    for y in 0..height {
        for x in 0..padded_w as usize {
            let src_x = x.min(resized_w as usize - 1) as u32;
            let value = gray.get_pixel(src_x, y as u32)[0] as f32;
            tensor[[0, 0, y, x]] = (value / 255.0 - 0.5) / 0.5;
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_default_charset() {
        let chars = parse_charset(DEFAULT_CHARSET);
        assert_eq!(chars.len(), 96);
        assert_eq!(chars[0], '0');
        assert!(chars.contains(&' '));
        assert!(chars.contains(&'€'));
        assert_eq!(*chars.last().unwrap(), 'z');
    }

    #[test]
    fn test_parse_charset_ignores_line_breaks() {
        assert_eq!(parse_charset("ab\nc\r\n"), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_custom_mean() {
        assert_eq!(custom_mean(&[]), 0.0);
        assert!((custom_mean(&[1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
        // n = 4: (0.5^4)^(2/2) = 0.0625
        assert!((custom_mean(&[0.5, 0.5, 0.5, 0.5]) - 0.0625).abs() < 1e-6);
        // n = 1: p^2
        assert!((custom_mean(&[0.9]) - 0.81).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_crop_shape() {
        let crop = DynamicImage::new_rgb8(100, 32);
        let tensor = preprocess_crop(&crop);
        // ratio 3.125 -> padded to 4 * 64
        assert_eq!(tensor.shape(), &[1, 1, 64, 256]);
    }

    #[test]
    fn test_preprocess_crop_replicates_last_column() {
        let crop = GrayImage::from_fn(20, 20, |x, _| Luma([if x < 10 { 0 } else { 255 }]));
        let tensor = preprocess_crop(&DynamicImage::ImageLuma8(crop));
        assert_eq!(tensor.shape(), &[1, 1, 64, 64]);
        assert!((tensor[[0, 0, 10, 0]] + 1.0).abs() < 1e-5);
        assert!((tensor[[0, 0, 10, 63]] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_preprocess_tall_crop() {
        let tensor = preprocess_crop(&DynamicImage::new_rgb8(10, 100));
        assert_eq!(tensor.shape(), &[1, 1, 64, 64]);
    }

    #[test]
    fn test_model_not_found_error() {
        let err = CrnnRecognizer::new("/nonexistent/recognizer.onnx", None, 1).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
