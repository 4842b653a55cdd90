// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tensor preparation shared by the detectors and recognizers

use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Side of the square DB detector input
pub const DET_INPUT_SIZE: u32 = 640;

/// Paddle recognizer input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Paddle recognizer width bounds
pub const REC_MIN_WIDTH: u32 = 4;
pub const REC_MAX_WIDTH: u32 = 320;

/// Letterbox fill colour
pub const PAD_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Per-channel `(pixel / 255 - mean) / std`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalization {
    pub const IMAGENET: Self = Self {
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
    };

    /// Maps 0..=255 onto -1..=1
    pub const SYMMETRIC: Self = Self {
        mean: [0.5; 3],
        std: [0.5; 3],
    };

    #[inline]
    pub fn apply(&self, channel: usize, value: u8) -> f32 {
        (value as f32 / 255.0 - self.mean[channel]) / self.std[channel]
    }
}

/// Copy `rgb` into the top-left corner of a `[1, 3, H, W]` tensor
///
/// Cells outside the image keep whatever the tensor held.
pub fn write_rgb(tensor: &mut Array4<f32>, rgb: &RgbImage, norm: Normalization) {
    let (_, channels, height, width) = tensor.dim();
    debug_assert_eq!(channels, 3);

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        if x >= width || y >= height {
            continue;
        }
        for c in 0..3 {
            tensor[[0, c, y, x]] = norm.apply(c, pixel[c]);
        }
    }
}

/// Aspect-preserving fit of an image into a square, centred on a gray canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub side: u32,
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl Letterbox {
    pub fn fit(width: u32, height: u32, side: u32) -> Self {
        if width == 0 || height == 0 {
            return Self {
                side,
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                scaled_width: 0,
                scaled_height: 0,
                original_width: width,
                original_height: height,
            };
        }

        let scale = (side as f32 / width as f32).min(side as f32 / height as f32);
        let scaled_width = ((width as f32 * scale).round() as u32).clamp(1, side);
        let scaled_height = ((height as f32 * scale).round() as u32).clamp(1, side);

        Self {
            side,
            scale,
            offset_x: (side - scaled_width) / 2,
            offset_y: (side - scaled_height) / 2,
            scaled_width,
            scaled_height,
            original_width: width,
            original_height: height,
        }
    }

    pub fn render(&self, image: &DynamicImage) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.side, self.side, PAD_GRAY);
        if self.scaled_width == 0 || self.scaled_height == 0 {
            return canvas;
        }

        let scaled = image
            .resize_exact(self.scaled_width, self.scaled_height, FilterType::Triangle)
            .to_rgb8();
        imageops::replace(
            &mut canvas,
            &scaled,
            self.offset_x as i64,
            self.offset_y as i64,
        );
        canvas
    }

    /// Letterbox coordinates back to source pixels, clamped to the source
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let source_x = (x - self.offset_x as f32) / self.scale;
        let source_y = (y - self.offset_y as f32) / self.scale;
        (
            source_x.clamp(0.0, self.original_width as f32),
            source_y.clamp(0.0, self.original_height as f32),
        )
    }
}

/// DB detector input: 640 letterbox, ImageNet normalization, NCHW
pub fn detection_tensor(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let letterbox = Letterbox::fit(width, height, DET_INPUT_SIZE);

    let side = DET_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, side, side));
    write_rgb(&mut tensor, &letterbox.render(image), Normalization::IMAGENET);

    (tensor, letterbox)
}

/// Paddle recognizer input: 48 rows, width following the aspect ratio
pub fn recognition_tensor(crop: &DynamicImage) -> Array4<f32> {
    let (width, height) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / height.max(1) as f32;
    let target_width = ((width as f32 * scale).round() as u32).clamp(REC_MIN_WIDTH, REC_MAX_WIDTH);

    let rgb = crop
        .resize_exact(target_width, REC_INPUT_HEIGHT, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::zeros((1, 3, REC_INPUT_HEIGHT as usize, target_width as usize));
    write_rgb(&mut tensor, &rgb, Normalization::SYMMETRIC);
    tensor
}
