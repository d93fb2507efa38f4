//! # Augmentor - weather and lighting augmentation for training images
//!
//! Augmentor takes one source image and produces a small batch of perturbed
//! variants (rain, fog, glare, shadow, blur) for training vision models.
//!
//! ## Features
//!
//! - **Recipes**: four named pipelines, one of them swept from subtle to heavy
//!   across the batch
//! - **Reproducible**: one seeded generator per request drives every draw
//! - **Quality guard**: blurry or dark candidates get one more try
//! - **Service**: JSON over HTTP, plus a command line for local files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use augmentor::prelude::*;
//!
//! let image = image::open("street.jpg")?.to_rgb8();
//! let image = bound_longest_side(image, MAX_SIDE);
//!
//! let generator = VariantGenerator::default();
//! let variants = generator.generate(&image, "weather_basic", 6, Some(42))?;
//! for (i, variant) in variants.iter().enumerate() {
//!     std::fs::write(format!("variant_{i:02}.jpg"), encode_jpeg(variant, JPEG_QUALITY)?)?;
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: shared types, errors, configuration and the request RNG
//! - [`effects`]: the transform steps a recipe is made of
//! - [`pipeline`]: ordered probabilistic steps
//! - [`recipes`]: the recipe catalog and strength-derived parameters
//! - [`quality`]: blur and darkness heuristics
//! - [`generator`]: strength sweep and retry loop
//! - [`io`]: source acquisition and JPEG transport encoding
//! - [`service`]: request validation and orchestration
//! - [`server`]: the axum HTTP surface

#![warn(clippy::all)]

pub mod core;
pub mod effects;
pub mod generator;
pub mod io;
pub mod pipeline;
pub mod quality;
pub mod recipes;
pub mod server;
pub mod service;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use augmentor::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Image, Roi, JPEG_QUALITY, MAX_SIDE};
    pub use crate::core::rng::{request_rng, RequestRng};
    pub use crate::core::config::AugmentorConfig;

    // Errors
    pub use crate::core::error::{
        AugmentError, AugmentResult, ConfigError, EffectError, EncodeError, FetchError,
    };

    // Effects
    pub use crate::effects::{
        bound_longest_side, BrightnessContrast, Category, Downscale, Effect, EffectMetadata, Fog,
        MotionBlur, ParamValue, Rain, Shadow, SunFlare,
    };

    // Pipelines and recipes
    pub use crate::pipeline::{Pipeline, Step, StepDescription};
    pub use crate::recipes::{Recipe, RecipeInfo, RecipeKind, WeatherParams};

    // Generation
    pub use crate::generator::{Variant, VariantGenerator, VariantReport};
    pub use crate::quality::{QualityGuard, QualityReport};

    // I/O and service
    pub use crate::io::{encode_jpeg, to_data_url, DefaultSource, HttpSource, ImageSource};
    pub use crate::service::{AugmentRequest, AugmentResponse, Augmentor};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "augmentor");
    }

    #[test]
    fn test_end_to_end_in_memory() {
        let image = crate::effects::test_support::textured(2400, 600);
        let image = bound_longest_side(image, MAX_SIDE);
        assert_eq!(image.dimensions(), (1600, 400));

        let variants = VariantGenerator::default()
            .generate(&image, "night_glare", 2, Some(17))
            .unwrap();
        assert_eq!(variants.len(), 2);
        for variant in &variants {
            assert_eq!(variant.dimensions(), (1600, 400));
            assert!(to_data_url(variant, JPEG_QUALITY).is_ok());
        }
    }
}
