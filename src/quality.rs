//! Quality guard: blur and darkness heuristics for generated variants.
//!
//! Both measures are pure functions of the pixels:
//! - **Blur**: variance of the Laplacian response over the luminance image.
//!   Sharp content has strong, varied edge response; blur flattens it.
//! - **Darkness**: mean of the HSV value channel (the per-pixel channel max).

use crate::core::types::Image;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Laplacian variance below which an image counts as too blurry.
pub const BLUR_THRESHOLD: f64 = 60.0;

/// Mean HSV value (0-255) below which an image counts as too dark.
pub const DARK_THRESHOLD: f64 = 18.0;

/// Thresholds used to judge a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityGuard {
    pub blur_threshold: f64,
    pub dark_threshold: f64,
}

impl Default for QualityGuard {
    fn default() -> Self {
        Self {
            blur_threshold: BLUR_THRESHOLD,
            dark_threshold: DARK_THRESHOLD,
        }
    }
}

/// Measurements and judgments for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Variance of the Laplacian of the luminance image.
    pub laplacian_variance: f64,
    /// Mean HSV value channel.
    pub mean_value: f64,
    pub too_blurry: bool,
    pub too_dark: bool,
}

impl QualityReport {
    /// Whether either judgment failed.
    pub fn is_poor(&self) -> bool {
        self.too_blurry || self.too_dark
    }
}

impl QualityGuard {
    /// Measure `image` and judge it against these thresholds.
    pub fn evaluate(&self, image: &Image) -> QualityReport {
        let laplacian_variance = laplacian_variance(image);
        let mean_value = mean_value(image);
        QualityReport {
            laplacian_variance,
            mean_value,
            too_blurry: laplacian_variance < self.blur_threshold,
            too_dark: mean_value < self.dark_threshold,
        }
    }

    pub fn is_too_blurry(&self, image: &Image) -> bool {
        laplacian_variance(image) < self.blur_threshold
    }

    pub fn is_too_dark(&self, image: &Image) -> bool {
        mean_value(image) < self.dark_threshold
    }
}

/// Too blurry under the default threshold.
pub fn is_too_blurry(image: &Image) -> bool {
    QualityGuard::default().is_too_blurry(image)
}

/// Too dark under the default threshold.
pub fn is_too_dark(image: &Image) -> bool {
    QualityGuard::default().is_too_dark(image)
}

/// Luminance with the BT.601 weights.
pub fn luminance(image: &Image) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Variance of the 4-neighbour Laplacian over the luminance image.
///
/// Returns 0.0 for zero-area images.
pub fn laplacian_variance(image: &Image) -> f64 {
    if image.width() == 0 || image.height() == 0 {
        return 0.0;
    }
    let gray = luminance(image);
    let response = imageproc::filter::laplacian_filter(&gray);

    let count = response.as_raw().len() as f64;
    let (sum, sum_sq) = response.as_raw().iter().fold((0.0f64, 0.0f64), |(s, sq), &v| {
        let v = v as f64;
        (s + v, sq + v * v)
    });
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// Mean of the HSV value channel, i.e. the per-pixel max of R, G and B.
///
/// Returns 0.0 for zero-area images.
pub fn mean_value(image: &Image) -> f64 {
    let pixels = image.width() as u64 * image.height() as u64;
    if pixels == 0 {
        return 0.0;
    }
    let total: u64 = image
        .pixels()
        .map(|p| p.0.iter().copied().max().unwrap_or(0) as u64)
        .sum();
    total as f64 / pixels as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::{flat, textured};
    use image::Rgb;

    #[test]
    fn test_black_image_is_too_dark() {
        assert!(is_too_dark(&flat(32, 32, 0)));
        assert!(is_too_dark(&flat(32, 32, 10)));
    }

    #[test]
    fn test_bright_image_is_not_dark() {
        assert!(!is_too_dark(&flat(32, 32, 120)));
    }

    #[test]
    fn test_value_channel_uses_max() {
        // Pure blue is dim in luminance but full value in HSV.
        let image = Image::from_pixel(4, 4, Rgb([0, 0, 255]));
        assert_eq!(mean_value(&image), 255.0);
        assert!(!is_too_dark(&image));
    }

    #[test]
    fn test_flat_image_is_too_blurry() {
        let image = flat(32, 32, 140);
        assert_eq!(laplacian_variance(&image), 0.0);
        assert!(is_too_blurry(&image));
    }

    #[test]
    fn test_textured_image_is_sharp() {
        let image = textured(64, 64);
        assert!(laplacian_variance(&image) > BLUR_THRESHOLD);
        assert!(!is_too_blurry(&image));
    }

    #[test]
    fn test_blur_lowers_variance() {
        let image = textured(64, 64);
        let blurred = imageproc::filter::gaussian_blur_f32(&image, 4.0);
        assert!(laplacian_variance(&blurred) < laplacian_variance(&image));
    }

    #[test]
    fn test_evaluate_report() {
        let report = QualityGuard::default().evaluate(&flat(16, 16, 0));
        assert!(report.too_blurry);
        assert!(report.too_dark);
        assert!(report.is_poor());

        let report = QualityGuard::default().evaluate(&textured(64, 64));
        assert!(!report.is_poor());
    }

    #[test]
    fn test_custom_thresholds() {
        let lenient = QualityGuard {
            blur_threshold: -1.0,
            dark_threshold: 0.0,
        };
        assert!(!lenient.evaluate(&flat(8, 8, 0)).is_poor());
    }

    #[test]
    fn test_zero_area_metrics() {
        let empty = Image::new(0, 0);
        assert_eq!(laplacian_variance(&empty), 0.0);
        assert_eq!(mean_value(&empty), 0.0);
    }
}
