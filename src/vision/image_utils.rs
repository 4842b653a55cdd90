// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload image decoding
//!
//! Formats are identified from content, never from the file name, so a
//! renamed file cannot smuggle a different format past the allow-list.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    Empty,

    #[error("Content is not a recognized raster image")]
    Unrecognized,

    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {format:?} image: {source}")]
    Decode {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Leading bytes of every format an upload may carry
const SIGNATURES: &[(&[u8], ImageFormat)] = &[
    (b"\x89PNG", ImageFormat::Png),
    (b"\xFF\xD8\xFF", ImageFormat::Jpeg),
    (b"GIF87a", ImageFormat::Gif),
    (b"GIF89a", ImageFormat::Gif),
    (b"BM", ImageFormat::Bmp),
    (b"II*\x00", ImageFormat::Tiff),
    (b"MM\x00*", ImageFormat::Tiff),
];

/// Identify the image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    SIGNATURES
        .iter()
        .find(|(signature, _)| bytes.starts_with(signature))
        .map(|(_, format)| *format)
        .ok_or(ImageError::Unrecognized)
}

/// File extensions that name `format`, lowercase
pub fn extension_aliases(format: ImageFormat) -> &'static [&'static str] {
    match format {
        ImageFormat::Png => &["png"],
        ImageFormat::Jpeg => &["jpg", "jpeg"],
        ImageFormat::Gif => &["gif"],
        ImageFormat::Bmp => &["bmp"],
        ImageFormat::Tiff => &["tiff", "tif"],
        _ => &[],
    }
}

/// Decode in-memory upload bytes, returning the image and its sniffed format
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), ImageError> {
    let format = detect_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|source| ImageError::Decode { format, source })?;
    Ok((image, format))
}

/// Read and decode an image file
pub fn open_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, ImageError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_image_bytes(&bytes).map(|(image, _)| image)
}

/// Grayscale with BT.601 luma weights, rounded to nearest
///
/// `DynamicImage::to_luma8` weights by Rec.709, which reads saturated reds
/// and blues noticeably darker.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([luma as u8])
    })
}
