// SPDX-License-Identifier: MIT
//
// OCR preprocessing: grayscale conversion, gamma correction via lookup
// table, and Gaussian-weighted adaptive inverse binarization.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

/// Gamma applied before binarization.
pub const OCR_GAMMA: f32 = 1.5;
/// Side length of the adaptive-threshold neighbourhood.
pub const OCR_BLOCK_SIZE: u32 = 41;
/// Bias subtracted from the local mean.
pub const OCR_BIAS: f32 = 10.0;

/// Precompute the 256-entry gamma correction table:
/// `out = 255 * (i / 255) ^ (1 / gamma)`, truncated to u8.
pub fn gamma_lut(gamma: f32) -> [u8; 256] {
    let inv = 1.0 / gamma;
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = ((i as f32 / 255.0).powf(inv) * 255.0) as u8;
    }
    table
}

/// Map every pixel of a grayscale image through a lookup table.
pub fn apply_lut(image: &GrayImage, table: &[u8; 256]) -> GrayImage {
    let mut output = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        output.put_pixel(x, y, Luma([table[pixel.0[0] as usize]]));
    }
    output
}

/// Adaptive inverse binarization with a Gaussian-weighted local mean.
///
/// Each pixel is compared against the Gaussian mean of its `block_size`
/// neighbourhood minus `bias`; pixels brighter than the threshold become 0
/// and darker pixels become 255, so dark print ends up as bright
/// foreground. Sigma is derived from the block size the same way OpenCV
/// derives it for its Gaussian adaptive threshold.
pub fn adaptive_threshold_inv(image: &GrayImage, block_size: u32, bias: f32) -> GrayImage {
    let sigma = 0.3 * ((block_size.saturating_sub(1)) as f32 * 0.5 - 1.0) + 0.8;
    let local_mean = gaussian_blur_f32(image, sigma);

    let mut output = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let threshold = local_mean.get_pixel(x, y).0[0] as f32 - bias;
        let value = if pixel.0[0] as f32 > threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }
    output
}

/// Full preprocessing chain for text detection: grayscale, gamma 1.5,
/// adaptive inverse threshold over a 41x41 neighbourhood with bias 10.
pub fn prepare_for_ocr(image: &RgbImage) -> GrayImage {
    let gray = DynamicImage::ImageRgb8(image.clone()).to_luma8();
    let corrected = apply_lut(&gray, &gamma_lut(OCR_GAMMA));
    let binarized = adaptive_threshold_inv(&corrected, OCR_BLOCK_SIZE, OCR_BIAS);
    debug!(
        width = binarized.width(),
        height = binarized.height(),
        "OCR preprocessing complete"
    );
    binarized
}
