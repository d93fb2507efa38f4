//! Brightness and contrast adjustment.

use crate::core::error::EffectError;
use crate::core::rng::{uniform, RequestRng};
use crate::core::types::Image;
use crate::effects::{Category, Effect, EffectMetadata, ParamValue};
use image::Pixel;

/// Random brightness and contrast shift.
///
/// Draws a contrast offset `c` and a brightness offset `b` from their ranges
/// and maps every channel as `v * (1 + c) + 255 * b`, clamped to `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessContrast {
    /// Brightness offset range, as a fraction of full scale.
    pub brightness: (f64, f64),
    /// Contrast offset range around a gain of 1.
    pub contrast: (f64, f64),
}

impl BrightnessContrast {
    /// Symmetric ranges `±brightness` and `±contrast`.
    pub fn symmetric(brightness: f64, contrast: f64) -> Self {
        Self {
            brightness: (-brightness, brightness),
            contrast: (-contrast, contrast),
        }
    }

    /// Explicit brightness range (may be biased, e.g. toward darkening).
    pub fn with_brightness_range(mut self, low: f64, high: f64) -> Self {
        self.brightness = (low, high);
        self
    }
}

impl Effect for BrightnessContrast {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("brightness_contrast", "Brightness/Contrast")
            .description("Random global brightness and contrast shift")
            .category(Category::Color)
            .parameter("brightness", ParamValue::Range(self.brightness.0, self.brightness.1))
            .parameter("contrast", ParamValue::Range(self.contrast.0, self.contrast.1))
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        EffectError::check_range("brightness_contrast", "brightness", self.brightness)?;
        EffectError::check_range("brightness_contrast", "contrast", self.contrast)?;
        EffectError::check_bounds("brightness_contrast", "contrast", self.contrast.0, -1.0, 1.0)
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        let gain = 1.0 + uniform(rng, self.contrast) as f32;
        let offset = 255.0 * uniform(rng, self.brightness) as f32;

        // Lookup table: the mapping is the same for every channel value.
        let mut table = [0u8; 256];
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = (value as f32 * gain + offset).round().clamp(0.0, 255.0) as u8;
        }

        for pixel in image.pixels_mut() {
            for channel in pixel.channels_mut() {
                *channel = table[*channel as usize];
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::request_rng;
    use crate::effects::test_support::{flat, mean_intensity};

    #[test]
    fn test_metadata() {
        let effect = BrightnessContrast::symmetric(0.2, 0.1);
        let metadata = effect.metadata();
        assert_eq!(metadata.id, "brightness_contrast");
        assert_eq!(metadata.get_parameter("brightness"), Some(&ParamValue::Range(-0.2, 0.2)));
    }

    #[test]
    fn test_zero_ranges_are_identity() {
        let mut image = flat(8, 8, 77);
        let mut rng = request_rng(Some(1));
        BrightnessContrast::symmetric(0.0, 0.0).apply(&mut image, &mut rng);
        assert!(image.pixels().all(|p| p.0 == [77, 77, 77]));
    }

    #[test]
    fn test_negative_bias_darkens() {
        let effect = BrightnessContrast::symmetric(0.0, 0.0).with_brightness_range(-0.3, -0.2);
        let mut image = flat(8, 8, 150);
        let mut rng = request_rng(Some(2));
        effect.apply(&mut image, &mut rng);
        assert!(mean_intensity(&image) < 100.0);
    }

    #[test]
    fn test_keeps_dimensions() {
        let mut image = flat(13, 7, 10);
        let mut rng = request_rng(None);
        BrightnessContrast::symmetric(0.5, 0.5).apply(&mut image, &mut rng);
        assert_eq!(image.dimensions(), (13, 7));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let effect = BrightnessContrast::symmetric(0.1, 0.1).with_brightness_range(0.3, -0.3);
        assert!(effect.validate().is_err());
    }
}
