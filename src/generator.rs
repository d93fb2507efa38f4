//! Variant generation: strength sweep, pipeline application and quality guard.

use crate::core::error::AugmentResult;
use crate::core::rng::{request_rng, uniform, RequestRng};
use crate::core::types::Image;
use crate::quality::{QualityGuard, QualityReport};
use crate::recipes::RecipeKind;
use serde::{Deserialize, Serialize};

/// Smallest batch a request can produce.
pub const MIN_VARIANTS: usize = 1;

/// Largest batch a request can produce.
pub const MAX_VARIANTS: usize = 12;

/// Extra pipeline applications allowed after a poor candidate.
pub const MAX_RETRIES: u32 = 1;

/// Clamp a requested count into `[MIN_VARIANTS, MAX_VARIANTS]`.
pub fn clamp_count(count: i64) -> usize {
    count.clamp(MIN_VARIANTS as i64, MAX_VARIANTS as i64) as usize
}

/// Strength progression across a `weather_basic` batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthSweep {
    count: usize,
}

impl StrengthSweep {
    pub const START: f64 = 0.6;
    pub const SPAN: f64 = 0.8;
    pub const JITTER: f64 = 0.15;
    pub const LIMITS: (f64, f64) = (0.5, 1.5);

    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Un-jittered strength for variant `index`.
    pub fn base(&self, index: usize) -> f64 {
        let denominator = self.count.saturating_sub(1).max(1) as f64;
        Self::START + Self::SPAN * (index as f64 / denominator)
    }

    /// Jittered, clamped strength for variant `index`. Draws once from `rng`.
    pub fn strength(&self, index: usize, rng: &mut RequestRng) -> f64 {
        let jitter = (uniform(rng, (0.0, 1.0)) - 0.5) * Self::JITTER;
        (self.base(index) + jitter).clamp(Self::LIMITS.0, Self::LIMITS.1)
    }
}

/// What happened while producing one variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    pub index: usize,
    /// Swept strength, for strength-aware recipes.
    pub strength: Option<f64>,
    /// Pipeline applications spent on this variant.
    pub attempts: u32,
    /// Measurement of the first candidate.
    pub initial_quality: QualityReport,
    /// Whether the guard asked for another application.
    pub retried: bool,
}

/// One generated variant with its report.
#[derive(Debug, Clone)]
pub struct Variant {
    pub image: Image,
    pub report: VariantReport,
}

/// Produces batches of augmented variants from one source image.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantGenerator {
    guard: QualityGuard,
}

impl VariantGenerator {
    pub fn new(guard: QualityGuard) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &QualityGuard {
        &self.guard
    }

    /// Generate `count` variants of `image` using `recipe_name`.
    ///
    /// `count` is clamped to `[1, 12]`. An unknown recipe fails before any
    /// variant is produced.
    pub fn generate(
        &self,
        image: &Image,
        recipe_name: &str,
        count: i64,
        seed: Option<i64>,
    ) -> AugmentResult<Vec<Image>> {
        Ok(self
            .generate_with_report(image, recipe_name, count, seed)?
            .into_iter()
            .map(|variant| variant.image)
            .collect())
    }

    /// Like [`generate`](Self::generate), keeping per-variant reports.
    pub fn generate_with_report(
        &self,
        image: &Image,
        recipe_name: &str,
        count: i64,
        seed: Option<i64>,
    ) -> AugmentResult<Vec<Variant>> {
        let mut rng = request_rng(seed);
        self.generate_with_rng(image, recipe_name, count, &mut rng)
    }

    /// Generate with a caller-owned generator.
    pub fn generate_with_rng(
        &self,
        image: &Image,
        recipe_name: &str,
        count: i64,
        rng: &mut RequestRng,
    ) -> AugmentResult<Vec<Variant>> {
        let kind: RecipeKind = recipe_name.parse()?;
        let count = clamp_count(count);
        let sweep = StrengthSweep::new(count);

        let mut variants = Vec::with_capacity(count);
        for index in 0..count {
            let strength = kind
                .is_strength_aware()
                .then(|| sweep.strength(index, rng));
            let pipeline = kind.with_strength(strength.unwrap_or(1.0)).build()?;

            let mut candidate = pipeline.apply(image, rng);
            let initial_quality = self.guard.evaluate(&candidate);
            let mut attempts = 1;
            let mut poor = initial_quality.is_poor();
            while attempts <= MAX_RETRIES && poor {
                log::debug!(
                    "variant {index}: poor candidate (laplacian {:.1}, value {:.1}), retrying",
                    initial_quality.laplacian_variance,
                    initial_quality.mean_value
                );
                candidate = pipeline.apply(image, rng);
                attempts += 1;
                // The retried candidate is accepted as is.
                poor = false;
            }

            let report = VariantReport {
                index,
                strength,
                attempts,
                initial_quality,
                retried: attempts > 1,
            };
            log::debug!(
                "variant {index}: recipe {kind}, strength {strength:?}, attempts {attempts}"
            );
            variants.push(Variant {
                image: candidate,
                report,
            });
        }
        Ok(variants)
    }
}
