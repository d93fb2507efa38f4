//! Recipe catalog and pipeline builder.
//!
//! The catalog is a closed set, so it is modelled as an enum rather than a
//! name-to-closure table: adding a recipe forces every `match` to handle it.
//!
//! | name            | strength-aware | steps                                           |
//! |-----------------|----------------|-------------------------------------------------|
//! | `weather_basic` | yes            | brightness, blur, rain, fog, shadow, sun flare  |
//! | `rain_heavy`    | no             | brightness, blur, rain, fog, shadow             |
//! | `fog_heavy`     | no             | brightness, fog, blur, shadow                   |
//! | `night_glare`   | no             | brightness, sun flare, blur, shadow, downscale  |

use crate::core::error::{AugmentError, AugmentResult};
use crate::core::types::Roi;
use crate::effects::{BrightnessContrast, Downscale, Fog, MotionBlur, Rain, Shadow, SunFlare};
use crate::pipeline::{Pipeline, StepDescription};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hard clamp applied to strength before deriving parameters.
pub const STRENGTH_LIMITS: (f64, f64) = (0.4, 1.6);

/// Smallest and largest motion blur kernel a strength can produce.
pub const MOTION_KERNEL_LIMITS: (u32, u32) = (3, 11);

/// Name of a catalog recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeKind {
    WeatherBasic,
    RainHeavy,
    FogHeavy,
    NightGlare,
}

impl RecipeKind {
    /// Every recipe, in catalog order.
    pub const ALL: [RecipeKind; 4] = [
        RecipeKind::WeatherBasic,
        RecipeKind::RainHeavy,
        RecipeKind::FogHeavy,
        RecipeKind::NightGlare,
    ];

    /// Wire name of the recipe.
    pub fn name(&self) -> &'static str {
        match self {
            RecipeKind::WeatherBasic => "weather_basic",
            RecipeKind::RainHeavy => "rain_heavy",
            RecipeKind::FogHeavy => "fog_heavy",
            RecipeKind::NightGlare => "night_glare",
        }
    }

    /// One-line description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            RecipeKind::WeatherBasic => "Mixed weather swept from subtle to heavy across the batch",
            RecipeKind::RainHeavy => "Heavy rain with motion blur and light fog",
            RecipeKind::FogHeavy => "Dense fog with occasional blur and shadow",
            RecipeKind::NightGlare => "Darkened scene with strong glare and resolution loss",
        }
    }

    /// Whether the recipe's parameters depend on strength.
    pub fn is_strength_aware(&self) -> bool {
        matches!(self, RecipeKind::WeatherBasic)
    }

    /// Bind a strength; fixed recipes ignore it.
    pub fn with_strength(self, strength: f64) -> Recipe {
        match self {
            RecipeKind::WeatherBasic => Recipe::WeatherBasic(strength),
            RecipeKind::RainHeavy => Recipe::RainHeavy,
            RecipeKind::FogHeavy => Recipe::FogHeavy,
            RecipeKind::NightGlare => Recipe::NightGlare,
        }
    }
}

impl fmt::Display for RecipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecipeKind {
    type Err = AugmentError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        RecipeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| AugmentError::UnknownRecipe(name.to_string()))
    }
}

/// A recipe ready to build, with its strength when it has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recipe {
    WeatherBasic(f64),
    RainHeavy,
    FogHeavy,
    NightGlare,
}

impl Recipe {
    pub fn kind(&self) -> RecipeKind {
        match self {
            Recipe::WeatherBasic(_) => RecipeKind::WeatherBasic,
            Recipe::RainHeavy => RecipeKind::RainHeavy,
            Recipe::FogHeavy => RecipeKind::FogHeavy,
            Recipe::NightGlare => RecipeKind::NightGlare,
        }
    }

    /// Assemble the pipeline without validating it.
    pub fn pipeline(&self) -> Pipeline {
        match *self {
            Recipe::WeatherBasic(strength) => weather_pipeline(&WeatherParams::derive(strength)),
            Recipe::RainHeavy => rain_heavy_pipeline(),
            Recipe::FogHeavy => fog_heavy_pipeline(),
            Recipe::NightGlare => night_glare_pipeline(),
        }
    }

    /// Assemble and validate the pipeline.
    pub fn build(&self) -> AugmentResult<Pipeline> {
        let pipeline = self.pipeline();
        pipeline.validate()?;
        Ok(pipeline)
    }
}

/// Build the pipeline for `recipe_name` at `strength`.
///
/// Fails with [`AugmentError::UnknownRecipe`] for names outside the catalog.
pub fn build(recipe_name: &str, strength: f64) -> AugmentResult<Pipeline> {
    let kind: RecipeKind = recipe_name.parse()?;
    kind.with_strength(strength).build()
}

/// Clamp `round(n)` into `[lo, hi]` and force it odd.
///
/// An even value moves up by one unless that would pass `hi`, in which case
/// it moves down.
pub fn odd_in_range(n: f64, lo: u32, hi: u32) -> u32 {
    let k = (n.round() as i64).clamp(lo as i64, hi as i64) as u32;
    if k % 2 == 0 {
        if k < hi {
            k + 1
        } else {
            k - 1
        }
    } else {
        k
    }
}

/// Concrete `weather_basic` parameters for one strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherParams {
    /// Strength after clamping to [`STRENGTH_LIMITS`].
    pub strength: f64,
    pub brightness_range: f64,
    pub contrast_range: f64,
    pub fog_lower: f64,
    pub fog_upper: f64,
    pub fog_alpha: f64,
    pub rain_drop_length: u32,
    pub rain_brightness_coefficient: f64,
    pub sun_flare_radius: u32,
    pub motion_blur_kernel: u32,
}

impl WeatherParams {
    /// Derive every parameter from `strength`.
    pub fn derive(strength: f64) -> Self {
        let s = strength.clamp(STRENGTH_LIMITS.0, STRENGTH_LIMITS.1);
        let (k_lo, k_hi) = MOTION_KERNEL_LIMITS;
        Self {
            strength: s,
            brightness_range: (0.18 * s + 0.12).min(0.5),
            contrast_range: 0.18 * s,
            fog_lower: 0.12 * s,
            fog_upper: 0.35 * s,
            fog_alpha: 0.08 * s,
            rain_drop_length: (8.0 + 7.0 * s).floor() as u32,
            rain_brightness_coefficient: (1.0 - 0.10 * s).max(0.82),
            sun_flare_radius: (60.0 + 50.0 * s).floor() as u32,
            motion_blur_kernel: odd_in_range(5.0 * s, k_lo, k_hi),
        }
    }
}

fn weather_pipeline(p: &WeatherParams) -> Pipeline {
    Pipeline::new()
        .step(BrightnessContrast::symmetric(p.brightness_range, p.contrast_range), 1.0)
        .step(MotionBlur::new(p.motion_blur_kernel), 0.5)
        .step(Rain::new(p.rain_drop_length, 1, 3, p.rain_brightness_coefficient), 0.6)
        .step(Fog::new(p.fog_lower, p.fog_upper, p.fog_alpha), 0.45)
        .step(Shadow::default(), 0.45)
        .step(SunFlare::new(Roi::TOP_HALF, 0.5, p.sun_flare_radius), 0.4)
}

fn rain_heavy_pipeline() -> Pipeline {
    Pipeline::new()
        .step(BrightnessContrast::symmetric(0.25, 0.2), 1.0)
        .step(MotionBlur::new(9), 0.6)
        .step(Rain::new(16, 2, 4, 0.88), 1.0)
        .step(Fog::new(0.15, 0.28, 0.08), 0.25)
        .step(Shadow::default(), 0.4)
}

fn fog_heavy_pipeline() -> Pipeline {
    Pipeline::new()
        .step(BrightnessContrast::symmetric(0.18, 0.15), 1.0)
        .step(Fog::new(0.25, 0.45, 0.10), 1.0)
        .step(MotionBlur::new(7), 0.4)
        .step(Shadow::default(), 0.35)
}

fn night_glare_pipeline() -> Pipeline {
    Pipeline::new()
        .step(
            BrightnessContrast::symmetric(0.0, 0.2).with_brightness_range(-0.25, 0.05),
            1.0,
        )
        .step(SunFlare::new(Roi::new(0.0, 0.0, 1.0, 0.6), 0.4, 90), 0.8)
        .step(MotionBlur::new(5), 0.4)
        .step(Shadow::default(), 0.4)
        .step(Downscale::new(0.8, 0.95), 0.3)
}

/// Catalog entry for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: RecipeKind,
    pub description: String,
    pub strength_aware: bool,
    /// Steps at the reference strength of 1.0.
    pub steps: Vec<StepDescription>,
}

/// Describe every recipe in the catalog.
pub fn catalog() -> Vec<RecipeInfo> {
    RecipeKind::ALL
        .into_iter()
        .map(|kind| RecipeInfo {
            name: kind,
            description: kind.description().to_string(),
            strength_aware: kind.is_strength_aware(),
            steps: kind.with_strength(1.0).pipeline().describe(),
        })
        .collect()
}
