// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image quality metrics for OCR suitability

use image::GrayImage;
use serde::{Deserialize, Serialize};

use super::enhance::reflect101;

/// Laplacian variance below this is considered blurry
pub const BLUR_THRESHOLD: f64 = 100.0;

/// Mean intensity below this is considered too dark
pub const DARK_THRESHOLD: f64 = 50.0;

/// Mean intensity above this is considered too bright
pub const BRIGHT_THRESHOLD: f64 = 200.0;

/// Intensity standard deviation below this is considered low contrast
pub const CONTRAST_THRESHOLD: f64 = 30.0;

/// Quality report returned by the analyze endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Laplacian variance (sharpness proxy)
    pub blur_score: f64,
    /// Mean grayscale intensity
    pub brightness: f64,
    /// Grayscale intensity standard deviation
    pub contrast: f64,
    /// "WIDTHxHEIGHT"
    pub resolution: String,
    pub quality_assessment: String,
}

/// Compute quality metrics for a grayscale image
pub fn analyze(gray: &GrayImage) -> QualityMetrics {
    let blur = laplacian_variance(gray);
    let (brightness, contrast) = mean_and_std(gray);
    let (width, height) = gray.dimensions();

    QualityMetrics {
        blur_score: round2(blur),
        brightness: round2(brightness),
        contrast: round2(contrast),
        resolution: format!("{}x{}", width, height),
        quality_assessment: assess_quality(blur, brightness, contrast),
    }
}

/// Map the three scalars to a verdict string
///
/// Pure function: "excellent", "good (slightly X)" or "fair (X, Y, ...)".
pub fn assess_quality(blur_score: f64, brightness: f64, contrast: f64) -> String {
    let mut issues = Vec::new();

    if blur_score < BLUR_THRESHOLD {
        issues.push("blurry");
    }
    if brightness < DARK_THRESHOLD {
        issues.push("too dark");
    } else if brightness > BRIGHT_THRESHOLD {
        issues.push("too bright");
    }
    if contrast < CONTRAST_THRESHOLD {
        issues.push("low contrast");
    }

    match issues.as_slice() {
        [] => "excellent".to_string(),
        [issue] => format!("good (slightly {})", issue),
        _ => format!("fair ({})", issues.join(", ")),
    }
}

/// Population variance of the 4-neighbour Laplacian
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    let count = width as u64 * height as u64;
    if count == 0 {
        return 0.0;
    }

    let (w, h) = (width as i64, height as i64);
    let px = |x: i64, y: i64| -> f64 {
        gray.get_pixel(reflect101(x, w) as u32, reflect101(y, h) as u32)[0] as f64
    };

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..h {
        for x in 0..w {
            let lap = px(x, y - 1) + px(x, y + 1) + px(x - 1, y) + px(x + 1, y) - 4.0 * px(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Mean and population standard deviation of intensities
pub fn mean_and_std(gray: &GrayImage) -> (f64, f64) {
    let n = gray.width() as f64 * gray.height() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }

    let (sum, sum_sq) = gray.pixels().fold((0.0, 0.0), |(s, sq), p| {
        let v = p[0] as f64;
        (s + v, sq + v * v)
    });

    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    (mean, variance.sqrt())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
