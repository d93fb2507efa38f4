//! Resolution effects: downscale degradation and input size bounding.

use crate::core::error::EffectError;
use crate::core::rng::{uniform, RequestRng};
use crate::core::types::Image;
use crate::effects::{Category, Effect, EffectMetadata, ParamValue};
use image::imageops::{self, FilterType};

/// Resolution loss: shrink with nearest-neighbour, then scale back up.
#[derive(Debug, Clone, PartialEq)]
pub struct Downscale {
    /// Smallest scale factor.
    pub scale_min: f64,
    /// Largest scale factor.
    pub scale_max: f64,
}

impl Downscale {
    pub fn new(scale_min: f64, scale_max: f64) -> Self {
        Self {
            scale_min,
            scale_max,
        }
    }
}

impl Effect for Downscale {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("downscale", "Downscale")
            .description("Lose detail by shrinking and re-enlarging the frame")
            .category(Category::Transform)
            .parameter("scale", ParamValue::Range(self.scale_min, self.scale_max))
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        EffectError::check_range("downscale", "scale", (self.scale_min, self.scale_max))?;
        EffectError::check_bounds("downscale", "scale_min", self.scale_min, 0.01, 1.0)?;
        EffectError::check_bounds("downscale", "scale_max", self.scale_max, 0.01, 1.0)
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        let scale = uniform(rng, (self.scale_min, self.scale_max));
        let (width, height) = image.dimensions();
        let small_w = ((width as f64 * scale) as u32).max(1);
        let small_h = ((height as f64 * scale) as u32).max(1);
        if (small_w, small_h) == (width, height) {
            return;
        }

        let small = imageops::resize(&*image, small_w, small_h, FilterType::Nearest);
        *image = imageops::resize(&small, width, height, FilterType::Triangle);
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}

/// Dimensions after capping the longest side at `max_side`.
///
/// Scales both sides by `max_side / longest` and truncates, never below one
/// pixel. Images already within the bound keep their size.
pub fn bounded_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    let new_w = ((width as f64 * scale) as u32).clamp(1, max_side);
    let new_h = ((height as f64 * scale) as u32).clamp(1, max_side);
    (new_w, new_h)
}

/// Cap the longest side at `max_side`, preserving aspect ratio.
///
/// Downsampling uses a triangle filter whose support widens with the scale
/// factor, so every source pixel contributes with area weighting.
pub fn bound_longest_side(image: Image, max_side: u32) -> Image {
    let (width, height) = image.dimensions();
    let (new_w, new_h) = bounded_dimensions(width, height, max_side);
    if (new_w, new_h) == (width, height) {
        return image;
    }
    log::debug!("bounding source {width}x{height} -> {new_w}x{new_h}");
    imageops::resize(&image, new_w, new_h, FilterType::Triangle)
}
