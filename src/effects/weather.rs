//! Weather overlays: rain streaks and fog haze.

use crate::core::error::EffectError;
use crate::core::rng::{uniform, uniform_int, RequestRng};
use crate::core::types::Image;
use crate::effects::draw::{blend_disc, scale_channels};
use crate::effects::{Category, Effect, EffectMetadata, ParamValue};
use image::Rgb;
use imageproc::drawing::draw_line_segment_mut;

/// Image area covered per rain drop.
const AREA_PER_DROP: u64 = 600;

/// Rain streaks followed by a soft blur and a global darkening.
#[derive(Debug, Clone, PartialEq)]
pub struct Rain {
    /// Streak length in pixels.
    pub drop_length: u32,
    /// Streak width in pixels.
    pub drop_width: u32,
    /// Box blur size applied after drawing.
    pub blur_value: u32,
    /// Multiplier applied to every channel (equivalently, to HSV value).
    pub brightness_coefficient: f64,
    /// Horizontal slant range of the streaks, in pixels.
    pub slant: (i64, i64),
    /// Streak color.
    pub drop_color: [u8; 3],
}

impl Rain {
    pub fn new(drop_length: u32, drop_width: u32, blur_value: u32, brightness_coefficient: f64) -> Self {
        Self {
            drop_length,
            drop_width,
            blur_value,
            brightness_coefficient,
            slant: (-10, 10),
            drop_color: [200, 200, 200],
        }
    }

    fn draw_drops(&self, image: &mut Image, rng: &mut RequestRng, slant: i64) {
        let (width, height) = image.dimensions();
        let (w, h) = (width as i64, height as i64);
        let drops = (w as u64 * h as u64) / AREA_PER_DROP;
        let length = self.drop_length as i64;
        let color = Rgb(self.drop_color);

        for _ in 0..drops {
            let x = if slant < 0 {
                uniform_int(rng, -slant, w - 1)
            } else {
                uniform_int(rng, 0, (w - 1 - slant).max(0))
            };
            let y = uniform_int(rng, 0, (h - 1 - length).max(0));

            for offset in 0..self.drop_width.max(1) as i64 {
                let x0 = (x + offset) as f32;
                draw_line_segment_mut(
                    &mut *image,
                    (x0, y as f32),
                    (x0 + slant as f32, (y + length) as f32),
                    color,
                );
            }
        }
    }
}

impl Effect for Rain {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("rain", "Rain")
            .description("Slanted rain streaks with blur and dimming")
            .category(Category::Weather)
            .parameter("drop_length", ParamValue::Integer(self.drop_length as i64))
            .parameter("drop_width", ParamValue::Integer(self.drop_width as i64))
            .parameter("blur_value", ParamValue::Integer(self.blur_value as i64))
            .parameter(
                "brightness_coefficient",
                ParamValue::Float(self.brightness_coefficient),
            )
            .parameter("slant", ParamValue::IntRange(self.slant.0, self.slant.1))
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        EffectError::check_bounds(
            "rain",
            "brightness_coefficient",
            self.brightness_coefficient,
            0.0,
            1.0,
        )?;
        EffectError::check_range("rain", "slant", (self.slant.0 as f64, self.slant.1 as f64))?;
        EffectError::check_bounds("rain", "drop_length", self.drop_length as f64, 1.0, 100.0)?;
        EffectError::check_bounds("rain", "drop_width", self.drop_width as f64, 1.0, 5.0)?;
        EffectError::check_bounds("rain", "blur_value", self.blur_value as f64, 1.0, 32.0)
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        let slant = uniform_int(rng, self.slant.0, self.slant.1);
        self.draw_drops(image, rng, slant);

        if self.blur_value > 1 {
            let size = self.blur_value as usize;
            let kernel = vec![1.0 / size as f32; size];
            *image = imageproc::filter::separable_filter(&*image, &kernel, &kernel);
        }

        scale_channels(image, self.brightness_coefficient as f32);
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}

/// Fog haze: translucent white discs spreading from the frame centre, then a
/// blur proportional to the haze size.
#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    /// Lower bound of the fog coefficient.
    pub coef_lower: f64,
    /// Upper bound of the fog coefficient.
    pub coef_upper: f64,
    /// Opacity of each haze disc.
    pub alpha_coef: f64,
}

impl Fog {
    pub fn new(coef_lower: f64, coef_upper: f64, alpha_coef: f64) -> Self {
        Self {
            coef_lower,
            coef_upper,
            alpha_coef,
        }
    }
}

/// Number of concentric spread rings of haze discs.
const FOG_RINGS: i64 = 4;

impl Effect for Fog {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("fog", "Fog")
            .description("Translucent haze concentrated toward the frame centre")
            .category(Category::Weather)
            .parameter("fog_coef", ParamValue::Range(self.coef_lower, self.coef_upper))
            .parameter("alpha_coef", ParamValue::Float(self.alpha_coef))
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        EffectError::check_range("fog", "fog_coef", (self.coef_lower, self.coef_upper))?;
        EffectError::check_bounds("fog", "fog_coef", self.coef_upper, 0.0, 1.0)?;
        EffectError::check_bounds("fog", "alpha_coef", self.alpha_coef, 0.0, 1.0)
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let (w, h) = (width as i64, height as i64);
        let fog_coef = uniform(rng, (self.coef_lower, self.coef_upper));
        let haze = ((w / 3) as f64 * fog_coef).max(10.0) as i64;
        let white = Rgb([255, 255, 255]);
        let alpha = self.alpha_coef as f32;

        // Each ring widens the sampling window around the centre and adds
        // proportionally more discs, so the haze is densest in the middle.
        for ring in 1..=FOG_RINGS {
            let half_w = (w * ring / (2 * FOG_RINGS)).max(1);
            let half_h = (h * ring / (2 * FOG_RINGS)).max(1);
            let discs = (haze / 10).max(1) * ring;
            for _ in 0..discs {
                let x = uniform_int(rng, w / 2 - half_w, w / 2 + half_w);
                let y = uniform_int(rng, h / 2 - half_h, h / 2 + half_h);
                blend_disc(image, (x, y), haze / 2, white, alpha);
            }
        }

        let sigma = (haze / 10) as f32 / 2.0;
        if sigma >= 0.5 {
            *image = imageproc::filter::gaussian_blur_f32(&*image, sigma);
        }
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}
