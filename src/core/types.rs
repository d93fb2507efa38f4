//! Shared value types for the augmentation pipeline.
//!
//! Images are plain `RgbImage` buffers: 8-bit, three channels, RGB ordering
//! everywhere in the crate. Decoders convert to this layout on the way in.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// The raster every effect, recipe and evaluator operates on.
pub type Image = RgbImage;

/// Longest side allowed before any recipe runs.
pub const MAX_SIDE: u32 = 1600;

/// JPEG quality requested from the transport encoder.
pub const JPEG_QUALITY: u8 = 90;

/// Region of interest as fractions of the frame, `[x_min, y_min, x_max, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Roi {
    /// The whole frame.
    pub const FULL: Roi = Roi::new(0.0, 0.0, 1.0, 1.0);

    /// Upper half of the frame.
    pub const TOP_HALF: Roi = Roi::new(0.0, 0.0, 1.0, 0.5);

    /// Lower half of the frame.
    pub const BOTTOM_HALF: Roi = Roi::new(0.0, 0.5, 1.0, 1.0);

    /// Create a region from fractional corners.
    pub const fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Pixel bounds `(x0, y0, x1, y1)` of this region in a `width`×`height` frame.
    ///
    /// The returned bounds are inclusive and always lie inside the frame.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let max_x = width.saturating_sub(1);
        let max_y = height.saturating_sub(1);
        let scale = |fraction: f64, extent: u32, max: u32| -> u32 {
            ((fraction.clamp(0.0, 1.0) * extent as f64) as u32).min(max)
        };
        let x0 = scale(self.x_min, width, max_x);
        let y0 = scale(self.y_min, height, max_y);
        let x1 = scale(self.x_max, width, max_x).max(x0);
        let y1 = scale(self.y_max, height, max_y).max(y0);
        (x0, y0, x1, y1)
    }
}

impl Default for Roi {
    fn default() -> Self {
        Roi::FULL
    }
}

/// Blend one channel value toward `target` by `alpha` in `[0, 1]`.
#[inline]
pub fn blend_channel(value: u8, target: u8, alpha: f32) -> u8 {
    let alpha = alpha.clamp(0.0, 1.0);
    (value as f32 * (1.0 - alpha) + target as f32 * alpha)
        .round()
        .clamp(0.0, 255.0) as u8
}
