//! Pixel-level drawing helpers shared by the overlay effects.

use crate::core::types::{blend_channel, Image};
use image::Rgb;

/// Blend a filled disc toward `color` with constant `alpha`.
///
/// Parts of the disc outside the frame are skipped.
pub fn blend_disc(image: &mut Image, centre: (i64, i64), radius: i64, color: Rgb<u8>, alpha: f32) {
    blend_disc_with(image, centre, radius, color, |_| alpha);
}

/// Blend a filled disc toward `color`, with alpha a function of the
/// normalized distance from the centre (0 at the centre, 1 at the rim).
pub fn blend_disc_with<F>(image: &mut Image, centre: (i64, i64), radius: i64, color: Rgb<u8>, alpha: F)
where
    F: Fn(f32) -> f32,
{
    let (width, height) = image.dimensions();
    if radius <= 0 || width == 0 || height == 0 {
        return;
    }
    let (cx, cy) = centre;
    let x0 = (cx - radius).max(0);
    let x1 = (cx + radius).min(width as i64 - 1);
    let y0 = (cy - radius).max(0);
    let y1 = (cy + radius).min(height as i64 - 1);
    let r2 = (radius * radius) as f32;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let d2 = ((x - cx) * (x - cx) + (y - cy) * (y - cy)) as f32;
            if d2 > r2 {
                continue;
            }
            let a = alpha((d2 / r2).sqrt());
            if a <= 0.0 {
                continue;
            }
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                pixel.0[c] = blend_channel(pixel.0[c], color.0[c], a);
            }
        }
    }
}

/// Multiply every channel by `factor`, clamped to `[0, 255]`.
pub fn scale_channels(image: &mut Image, factor: f32) {
    for value in image.iter_mut() {
        *value = (*value as f32 * factor).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::flat;

    #[test]
    fn test_blend_disc_is_local() {
        let mut image = flat(21, 21, 0);
        blend_disc(&mut image, (10, 10), 3, Rgb([255, 255, 255]), 1.0);
        assert_eq!(image.get_pixel(10, 10).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(10, 14).0, [0, 0, 0]);
    }

    #[test]
    fn test_blend_disc_partially_outside() {
        let mut image = flat(5, 5, 0);
        blend_disc(&mut image, (-1, -1), 3, Rgb([255, 255, 255]), 1.0);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(4, 4).0, [0, 0, 0]);
    }

    #[test]
    fn test_radial_falloff() {
        let mut image = flat(41, 41, 0);
        blend_disc_with(&mut image, (20, 20), 20, Rgb([255, 255, 255]), |d| 1.0 - d);
        let centre = image.get_pixel(20, 20).0[0];
        let mid = image.get_pixel(30, 20).0[0];
        assert!(centre > mid);
        assert!(mid > 0);
    }

    #[test]
    fn test_scale_channels() {
        let mut image = flat(2, 2, 200);
        scale_channels(&mut image, 0.5);
        assert!(image.pixels().all(|p| p.0 == [100, 100, 100]));
    }
}
