// SPDX-License-Identifier: MIT
//
// Adaptive 3x3 sharpening filter with mirror border handling.

use image::RgbImage;

/// Weights of the 3x3 sharpening kernel: `(center, orthogonal)`. Corner
/// weights are always zero.
///
/// Text mode uses a stronger kernel with a floor: at intensity 0 the center
/// weight is still 2, so text always receives some sharpening, while the
/// non-text kernel is near-identity at intensity 0. The asymmetry is
/// intentional and load-bearing for legibility of embedded text.
pub fn kernel_weights(intensity: f32, text_mode: bool) -> (f32, f32) {
    if text_mode {
        (2.0 + 1.5 * intensity, -0.5)
    } else {
        (1.0 + 0.8 * intensity, -0.2)
    }
}

/// Apply the adaptive sharpening kernel to an RGB image.
///
/// The border is mirror-reflected across the edge (index -1 reads pixel 0,
/// index `w` reads pixel `w - 1`), so the output has the same dimensions as
/// the input. Channels are accumulated in f32 and saturated back to u8.
pub fn sharpen(image: &RgbImage, intensity: f32, text_mode: bool) -> RgbImage {
    let (center, orthogonal) = kernel_weights(intensity, text_mode);
    let (width, height) = image.dimensions();
    let mut output = RgbImage::new(width, height);

    let reflect = |i: i64, len: u32| -> u32 {
        let len = len as i64;
        let i = if i < 0 { -i - 1 } else if i >= len { 2 * len - i - 1 } else { i };
        i as u32
    };

    for y in 0..height {
        let up = reflect(y as i64 - 1, height);
        let down = reflect(y as i64 + 1, height);
        for x in 0..width {
            let left = reflect(x as i64 - 1, width);
            let right = reflect(x as i64 + 1, width);

            let mid = image.get_pixel(x, y);
            let n = image.get_pixel(x, up);
            let s = image.get_pixel(x, down);
            let w = image.get_pixel(left, y);
            let e = image.get_pixel(right, y);

            let mut out = [0u8; 3];
            for channel in 0..3 {
                let acc = center * mid.0[channel] as f32
                    + orthogonal
                        * (n.0[channel] as f32
                            + s.0[channel] as f32
                            + w.0[channel] as f32
                            + e.0[channel] as f32);
                out[channel] = acc.round().clamp(0.0, 255.0) as u8;
            }
            output.put_pixel(x, y, image::Rgb(out));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn uniform(width: u32, height: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([value, value, value]))
    }

    #[test]
    fn kernel_coefficients_match_reference() {
        assert_eq!(kernel_weights(0.0, false), (1.0, -0.2));
        assert_eq!(kernel_weights(1.0, false), (1.8, -0.2));
        assert_eq!(kernel_weights(3.0, false), (3.4, -0.2));
        assert_eq!(kernel_weights(0.0, true), (2.0, -0.5));
        assert_eq!(kernel_weights(2.0, true), (5.0, -0.5));
    }

    #[test]
    fn output_dimensions_equal_input() {
        let img = uniform(7, 5, 90);
        let out = sharpen(&img, 1.3, true);
        assert_eq!(out.dimensions(), (7, 5));
    }

    /// The non-text kernel sums to 0.2 + 0.8i, so a uniform image maps to
    /// clamp(v * (0.2 + 0.8i)). At i = 1 the sum is exactly 1 and the image
    /// passes through unchanged.
    #[test]
    fn uniform_image_scales_by_kernel_sum() {
        let img = uniform(8, 8, 100);

        let near_identity = sharpen(&img, 1.0, false);
        assert_eq!(near_identity.get_pixel(4, 4).0, [100, 100, 100]);

        let darkened = sharpen(&img, 0.0, false);
        assert_eq!(darkened.get_pixel(4, 4).0, [20, 20, 20]);
    }

    /// Text kernel sum is 1.5i: at i = 0 a uniform image collapses to zero,
    /// at i = 2 (sum 3) it saturates. Plain pass-through never happens; the
    /// text kernel always reshapes local contrast.
    #[test]
    fn text_kernel_keeps_sharpening_floor() {
        let img = uniform(8, 8, 100);

        let zeroed = sharpen(&img, 0.0, true);
        assert_eq!(zeroed.get_pixel(4, 4).0, [0, 0, 0]);

        let saturated = sharpen(&img, 2.0, true);
        assert_eq!(saturated.get_pixel(4, 4).0, [255, 255, 255]);
    }

    /// A bright pixel on a dark field: the center response is amplified and
    /// the orthogonal neighbours are suppressed below the background.
    #[test]
    fn impulse_response_matches_kernel() {
        let mut img = uniform(5, 5, 0);
        img.put_pixel(2, 2, Rgb([100, 100, 100]));

        let out = sharpen(&img, 1.0, false);
        // Center: 1.8 * 100 = 180.
        assert_eq!(out.get_pixel(2, 2).0, [180, 180, 180]);
        // Orthogonal neighbour: -0.2 * 100 = -20, clamped to 0.
        assert_eq!(out.get_pixel(2, 1).0, [0, 0, 0]);
        // Corner neighbour: weight 0 and all other taps are 0.
        assert_eq!(out.get_pixel(1, 1).0, [0, 0, 0]);
    }

    /// With mirror padding a corner pixel's out-of-bounds taps re-read the
    /// edge pixels, so a uniform image behaves identically at the border.
    #[test]
    fn mirror_border_keeps_uniform_response() {
        let img = uniform(4, 4, 100);
        let out = sharpen(&img, 1.0, false);
        assert_eq!(out.get_pixel(0, 0).0, [100, 100, 100]);
        assert_eq!(out.get_pixel(3, 3).0, [100, 100, 100]);
    }

    #[test]
    fn single_pixel_image_does_not_panic() {
        let img = uniform(1, 1, 50);
        let out = sharpen(&img, 0.0, false);
        // All four taps reflect back onto the single pixel: sum = 0.2.
        assert_eq!(out.get_pixel(0, 0).0, [10, 10, 10]);
    }
}
