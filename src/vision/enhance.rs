// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document enhancement chain applied before OCR
//!
//! Steps, all with fixed parameters:
//! 1. BT.601 grayscale conversion
//! 2. Bilateral filter (radius 4, sigma color 75, sigma space 75)
//! 3. CLAHE (clip limit 2.0, 8x8 tiles)
//! 4. 3x3 sharpen kernel
//! 5. Grayscale morphological close with a 1x1 square
//!
//! Steps 2, 4 and 5 come from `imageproc`, which replicates edge pixels at the
//! border. CLAHE and the quality Laplacian mirror without repeating the edge
//! pixel (`dcb|abcd|cba`).

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::bilateral::GaussianEuclideanColorDistance;
use imageproc::filter::{bilateral_filter, filter_clamped};
use imageproc::kernel::Kernel;
use imageproc::morphology::{grayscale_close, Mask};

use super::image_utils::to_gray;

/// Bilateral filter window radius (a 9 pixel diameter)
pub const BILATERAL_RADIUS: u8 = 4;

/// Bilateral filter range sigma
pub const BILATERAL_SIGMA_COLOR: f32 = 75.0;

/// Bilateral filter spatial sigma
pub const BILATERAL_SIGMA_SPACE: f32 = 75.0;

/// CLAHE histogram clip limit
pub const CLAHE_CLIP_LIMIT: f64 = 2.0;

/// CLAHE tile grid (columns, rows)
pub const CLAHE_TILE_GRID: (u32, u32) = (8, 8);

/// Sharpening kernel (row-major 3x3)
pub const SHARPEN_KERNEL: [i32; 9] = [-1, -1, -1, -1, 9, -1, -1, -1, -1];

/// Closing structuring element radius; 0 is a 1x1 square
pub const CLOSE_RADIUS: u8 = 0;

/// Run the full enhancement chain
pub fn enhance_document(image: &DynamicImage) -> GrayImage {
    let gray = to_gray(image);
    let denoised = denoise(&gray, BILATERAL_RADIUS, BILATERAL_SIGMA_COLOR, BILATERAL_SIGMA_SPACE);
    let enhanced = clahe(&denoised, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);
    let sharpened = sharpen(&enhanced);
    close(&sharpened, CLOSE_RADIUS)
}

/// Mirror an out-of-range index back into `0..n` without repeating the edge
pub(crate) fn reflect101(i: i64, n: i64) -> usize {
    if n <= 1 {
        return 0;
    }

    let mut i = i;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * (n - 1) - i;
        }
    }
    i as usize
}

/// Edge-preserving smoothing
pub fn denoise(image: &GrayImage, radius: u8, sigma_color: f32, sigma_space: f32) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    bilateral_filter(
        image,
        radius,
        sigma_space,
        GaussianEuclideanColorDistance::new(sigma_color),
    )
}

/// Convolve with [`SHARPEN_KERNEL`], saturating to `[0, 255]`
pub fn sharpen(image: &GrayImage) -> GrayImage {
    filter_clamped::<Luma<u8>, i32, u8>(image, Kernel::new(&SHARPEN_KERNEL, 3, 3))
}

/// Grayscale dilation then erosion with a `(2 * radius + 1)` square
pub fn close(image: &GrayImage, radius: u8) -> GrayImage {
    grayscale_close(image, &Mask::square(radius))
}

/// Contrast-limited adaptive histogram equalization
///
/// The image is split into a `tiles.0 x tiles.1` grid (padded by mirroring when
/// the size is not a multiple of the grid). Each tile gets a clipped,
/// redistributed histogram and a lookup table; pixels are mapped by bilinear
/// interpolation between the four nearest tile tables.
pub fn clahe(image: &GrayImage, clip_limit: f64, tiles: (u32, u32)) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let (tiles_x, tiles_y) = (tiles.0.max(1) as usize, tiles.1.max(1) as usize);
    let (w, h) = (width as usize, height as usize);
    let padded_w = w + (tiles_x - w % tiles_x) % tiles_x;
    let padded_h = h + (tiles_y - h % tiles_y) % tiles_y;
    let tile_w = padded_w / tiles_x;
    let tile_h = padded_h / tiles_y;
    let tile_area = tile_w * tile_h;

    let clip = if clip_limit > 0.0 {
        ((clip_limit * tile_area as f64 / 256.0) as usize).max(1)
    } else {
        usize::MAX
    };
    let lut_scale = 255.0 / tile_area as f64;

    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];

    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0usize; 256];
            for py in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect101(py as i64, h as i64) as u32;
                for px in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect101(px as i64, w as i64) as u32;
                    hist[image.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }

            clip_histogram(&mut hist, clip);

            let lut = &mut luts[ty * tiles_x + tx];
            let mut cumulative = 0usize;
            for (value, count) in hist.iter().enumerate() {
                cumulative += count;
                lut[value] = (cumulative as f64 * lut_scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let inv_tile_w = 1.0 / tile_w as f64;
    let inv_tile_h = 1.0 / tile_h as f64;
    let mut output = GrayImage::new(width, height);

    for y in 0..h {
        let tyf = y as f64 * inv_tile_h - 0.5;
        let ty1 = tyf.floor() as i64;
        let ya = tyf - ty1 as f64;
        let ty2 = ((ty1 + 1) as usize).min(tiles_y - 1);
        let ty1 = ty1.max(0) as usize;

        for x in 0..w {
            let txf = x as f64 * inv_tile_w - 0.5;
            let tx1 = txf.floor() as i64;
            let xa = txf - tx1 as f64;
            let tx2 = ((tx1 + 1) as usize).min(tiles_x - 1);
            let tx1 = tx1.max(0) as usize;

            let v = image.get_pixel(x as u32, y as u32)[0] as usize;
            let top = luts[ty1 * tiles_x + tx1][v] as f64 * (1.0 - xa)
                + luts[ty1 * tiles_x + tx2][v] as f64 * xa;
            let bottom = luts[ty2 * tiles_x + tx1][v] as f64 * (1.0 - xa)
                + luts[ty2 * tiles_x + tx2][v] as f64 * xa;
            let value = (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8;

            output.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    output
}

// Clip histogram bins at `limit` and spread the excess evenly.
fn clip_histogram(hist: &mut [usize; 256], limit: usize) {
    if limit == usize::MAX {
        return;
    }

    let mut excess = 0usize;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let batch = excess / 256;
    let mut residual = excess % 256;
    for count in hist.iter_mut() {
        *count += batch;
    }

    if residual > 0 {
        let step = (256 / residual).max(1);
        let mut i = 0;
        while i < 256 && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}
