//! Motion blur.

use crate::core::error::EffectError;
use crate::core::rng::{uniform, uniform_int, RequestRng};
use crate::core::types::Image;
use crate::effects::{Category, Effect, EffectMetadata, ParamValue};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::filter::Kernel;
use std::f64::consts::PI;

/// Smallest kernel a motion blur may use.
pub const MIN_KERNEL: u32 = 3;

/// Linear motion blur along a random direction.
///
/// Each application picks an odd kernel size in `[3, max_kernel]` and a
/// direction in `[0, π)`, rasterizes a line through the kernel centre and
/// averages the pixels under it.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionBlur {
    /// Largest kernel size; must be odd.
    pub max_kernel: u32,
}

impl MotionBlur {
    pub fn new(max_kernel: u32) -> Self {
        Self { max_kernel }
    }
}

impl Effect for MotionBlur {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("motion_blur", "Motion Blur")
            .description("Directional blur simulating camera or subject motion")
            .category(Category::Blur)
            .parameter(
                "kernel",
                ParamValue::IntRange(MIN_KERNEL as i64, self.max_kernel as i64),
            )
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        if self.max_kernel < MIN_KERNEL || self.max_kernel % 2 == 0 {
            return Err(EffectError::InvalidKernel {
                effect: "motion_blur",
                size: self.max_kernel,
            });
        }
        Ok(())
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        // Odd sizes only: pick an index into 3, 5, 7, ...
        let choices = (self.max_kernel.max(MIN_KERNEL) - MIN_KERNEL) / 2;
        let size = MIN_KERNEL + 2 * uniform_int(rng, 0, choices as i64) as u32;
        let angle = uniform(rng, (0.0, PI));

        let weights = line_weights(size, angle);
        let blurred: Image = Kernel::new(&weights, size, size)
            .filter(&*image, |channel: &mut u8, acc: f32| {
                *channel = acc.round().clamp(0.0, 255.0) as u8;
            });
        *image = blurred;
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}

fn line_mask(size: u32, angle: f64) -> GrayImage {
    let centre = (size / 2) as f32;
    let (sin, cos) = angle.sin_cos();
    let (dx, dy) = (cos as f32 * centre, sin as f32 * centre);

    let mut mask = GrayImage::new(size, size);
    draw_line_segment_mut(
        &mut mask,
        (centre - dx, centre - dy),
        (centre + dx, centre + dy),
        Luma([255u8]),
    );
    mask.put_pixel(size / 2, size / 2, Luma([255u8]));
    mask
}

/// Offsets of the taps of a line kernel of odd `size` at `angle` radians.
///
/// Returns `(dx, dy)` offsets from the centre.
pub fn line_kernel(size: u32, angle: f64) -> Vec<(i32, i32)> {
    let c = (size / 2) as i32;
    line_mask(size, angle)
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] > 0)
        .map(|(x, y, _)| (x as i32 - c, y as i32 - c))
        .collect()
}

/// Row-major `size * size` weights of the same line; taps share weight equally.
pub fn line_weights(size: u32, angle: f64) -> Vec<f32> {
    let mask = line_mask(size, angle);
    let taps = mask.pixels().filter(|p| p.0[0] > 0).count().max(1);
    let weight = 1.0 / taps as f32;
    mask.pixels()
        .map(|p| if p.0[0] > 0 { weight } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::request_rng;
    use crate::effects::test_support::{flat, textured};

    #[test]
    fn test_motion_blur_metadata() {
        let metadata = MotionBlur::new(9).metadata();
        assert_eq!(metadata.id, "motion_blur");
        assert_eq!(metadata.category, Category::Blur);
        assert_eq!(metadata.get_parameter("kernel"), Some(&ParamValue::IntRange(3, 9)));
    }

    #[test]
    fn test_validate_kernel_parity() {
        assert!(MotionBlur::new(7).validate().is_ok());
        assert!(MotionBlur::new(8).validate().is_err());
        assert!(MotionBlur::new(1).validate().is_err());
    }

    #[test]
    fn test_horizontal_line_kernel() {
        let taps = line_kernel(5, 0.0);
        assert!(taps.len() >= 3);
        assert!(taps.iter().all(|&(dx, dy)| dy == 0 && dx.abs() <= 2));
        assert!(taps.contains(&(0, 0)));
    }

    #[test]
    fn test_kernel_contains_centre_at_any_angle() {
        for step in 0..12 {
            let angle = PI * step as f64 / 12.0;
            let taps = line_kernel(11, angle);
            assert!(taps.contains(&(0, 0)));
            assert!(taps.iter().all(|&(dx, dy)| dx.abs() <= 5 && dy.abs() <= 5));
        }
    }

    #[test]
    fn test_line_weights_normalized() {
        for (size, angle) in [(3, 0.0), (7, PI / 4.0), (11, 2.0)] {
            let weights = line_weights(size, angle);
            assert_eq!(weights.len(), (size * size) as usize);
            let total: f32 = weights.iter().sum();
            assert!((total - 1.0).abs() < 1e-4, "sum {total}");

            let centre = (size / 2 * size + size / 2) as usize;
            assert!(weights[centre] > 0.0);
            let nonzero = weights.iter().filter(|&&w| w > 0.0).count();
            assert_eq!(nonzero, line_kernel(size, angle).len());
        }
    }

    #[test]
    fn test_flat_image_unchanged() {
        let mut image = flat(20, 20, 90);
        let mut rng = request_rng(Some(4));
        MotionBlur::new(11).apply(&mut image, &mut rng);
        assert!(image.pixels().all(|p| p.0 == [90, 90, 90]));
    }

    #[test]
    fn test_blur_changes_texture_not_size() {
        let original = textured(40, 30);
        let mut image = original.clone();
        let mut rng = request_rng(Some(5));
        MotionBlur::new(9).apply(&mut image, &mut rng);
        assert_eq!(image.dimensions(), (40, 30));
        assert_ne!(image, original);
    }
}
