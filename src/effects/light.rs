//! Lighting overlays: cast shadows and sun flare.

use crate::core::error::EffectError;
use crate::core::rng::{uniform, uniform_int, RequestRng};
use crate::core::types::{Image, Roi};
use crate::effects::draw::{blend_disc, blend_disc_with};
use crate::effects::{Category, Effect, EffectMetadata, ParamValue};
use image::{GrayImage, Luma, Rgb};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use std::f64::consts::TAU;

/// Darkened random polygons, like shade cast across the lower frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    /// Region the polygon vertices are drawn from.
    pub roi: Roi,
    /// Inclusive range for the number of shadows.
    pub count: (i64, i64),
    /// Vertices per shadow polygon.
    pub vertices: usize,
    /// Multiplier applied to shadowed pixels.
    pub intensity: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            roi: Roi::BOTTOM_HALF,
            count: (1, 2),
            vertices: 5,
            intensity: 0.5,
        }
    }
}

impl Shadow {
    fn polygon(&self, rng: &mut RequestRng, width: u32, height: u32) -> Vec<Point<i32>> {
        let (x0, y0, x1, y1) = self.roi.to_pixels(width, height);
        let mut points: Vec<Point<i32>> = Vec::with_capacity(self.vertices);
        for _ in 0..self.vertices {
            let x = uniform_int(rng, x0 as i64, x1 as i64) as i32;
            let y = uniform_int(rng, y0 as i64, y1 as i64) as i32;
            points.push(Point::new(x, y));
        }
        points.dedup();
        // draw_polygon_mut rejects closed paths.
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }
}

impl Effect for Shadow {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("shadow", "Shadow")
            .description("Random polygonal shadows")
            .category(Category::Lighting)
            .parameter(
                "roi",
                ParamValue::Region([self.roi.x_min, self.roi.y_min, self.roi.x_max, self.roi.y_max]),
            )
            .parameter("count", ParamValue::IntRange(self.count.0, self.count.1))
            .parameter("vertices", ParamValue::Integer(self.vertices as i64))
            .parameter("intensity", ParamValue::Float(self.intensity))
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        EffectError::check_range("shadow", "count", (self.count.0 as f64, self.count.1 as f64))?;
        EffectError::check_bounds("shadow", "vertices", self.vertices as f64, 3.0, 16.0)?;
        EffectError::check_bounds("shadow", "intensity", self.intensity, 0.0, 1.0)
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let shadows = uniform_int(rng, self.count.0, self.count.1);
        let mut mask = GrayImage::new(width, height);
        for _ in 0..shadows {
            let polygon = self.polygon(rng, width, height);
            if polygon.len() >= 3 {
                draw_polygon_mut(&mut mask, &polygon, Luma([255u8]));
            }
        }

        let factor = self.intensity as f32;
        for (pixel, shade) in image.pixels_mut().zip(mask.pixels()) {
            if shade.0[0] > 0 {
                for c in 0..3 {
                    pixel.0[c] = (pixel.0[c] as f32 * factor).round() as u8;
                }
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}

/// Sun flare: a bright radial glow with translucent flare discs strung along
/// a random direction through it.
#[derive(Debug, Clone, PartialEq)]
pub struct SunFlare {
    /// Region the flare source is placed in.
    pub roi: Roi,
    /// Lower bound of the flare direction, as a fraction of a full turn.
    pub angle_lower: f64,
    /// Upper bound of the flare direction, as a fraction of a full turn.
    pub angle_upper: f64,
    /// Radius of the source glow in pixels.
    pub src_radius: u32,
    /// Inclusive range for the number of flare discs.
    pub circles: (i64, i64),
}

impl SunFlare {
    pub fn new(roi: Roi, angle_lower: f64, src_radius: u32) -> Self {
        Self {
            roi,
            angle_lower,
            angle_upper: 1.0,
            src_radius,
            circles: (6, 10),
        }
    }
}

impl Effect for SunFlare {
    fn metadata(&self) -> EffectMetadata {
        EffectMetadata::builder("sun_flare", "Sun Flare")
            .description("Radial glare source with lens flare discs")
            .category(Category::Lighting)
            .parameter(
                "roi",
                ParamValue::Region([self.roi.x_min, self.roi.y_min, self.roi.x_max, self.roi.y_max]),
            )
            .parameter("angle", ParamValue::Range(self.angle_lower, self.angle_upper))
            .parameter("src_radius", ParamValue::Integer(self.src_radius as i64))
            .parameter("circles", ParamValue::IntRange(self.circles.0, self.circles.1))
            .build()
    }

    fn validate(&self) -> Result<(), EffectError> {
        EffectError::check_range("sun_flare", "angle", (self.angle_lower, self.angle_upper))?;
        EffectError::check_bounds("sun_flare", "angle_lower", self.angle_lower, 0.0, 1.0)?;
        EffectError::check_bounds("sun_flare", "angle_upper", self.angle_upper, 0.0, 1.0)?;
        EffectError::check_range(
            "sun_flare",
            "circles",
            (self.circles.0 as f64, self.circles.1 as f64),
        )
    }

    fn apply(&self, image: &mut Image, rng: &mut RequestRng) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let (x0, y0, x1, y1) = self.roi.to_pixels(width, height);
        let cx = uniform_int(rng, x0 as i64, x1 as i64);
        let cy = uniform_int(rng, y0 as i64, y1 as i64);
        let angle = TAU * uniform(rng, (self.angle_lower, self.angle_upper));
        let (sin, cos) = angle.sin_cos();
        let span = width as f64;
        let max_disc = (width as i64 / 25).max(2);
        let white = Rgb([255, 255, 255]);

        let circles = uniform_int(rng, self.circles.0, self.circles.1);
        for _ in 0..circles {
            let t = uniform(rng, (-span, span));
            let x = cx + (t * cos) as i64;
            let y = cy + (t * sin) as i64;
            let radius = uniform_int(rng, 1, max_disc);
            let alpha = uniform(rng, (0.05, 0.2)) as f32;
            blend_disc(image, (x, y), radius, white, alpha);
        }

        blend_disc_with(image, (cx, cy), self.src_radius as i64, white, |d| {
            let falloff = 1.0 - d;
            falloff * falloff
        });
    }

    fn clone_box(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }
}
