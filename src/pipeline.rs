//! Probabilistic transform pipelines.
//!
//! A [`Pipeline`] is an ordered list of [`Step`]s. Applying it clones the
//! source once and lets every enabled step mutate that working image in turn,
//! so later steps see the output of earlier ones. Each step draws its own
//! Bernoulli gate from the request RNG before drawing its parameters.

use crate::core::error::EffectError;
use crate::core::rng::{chance, RequestRng};
use crate::core::types::Image;
use crate::effects::{Effect, EffectMetadata};
use serde::{Deserialize, Serialize};

/// One transform with its application probability.
#[derive(Debug, Clone)]
pub struct Step {
    effect: Box<dyn Effect>,
    probability: f64,
}

impl Step {
    /// Create a step applied with `probability`.
    pub fn new(effect: impl Effect + 'static, probability: f64) -> Self {
        Self {
            effect: Box::new(effect),
            probability,
        }
    }

    /// The wrapped effect.
    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    /// Probability that the step fires on one application.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Check the probability and the effect's own parameters.
    pub fn validate(&self) -> Result<(), EffectError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(EffectError::InvalidProbability(self.probability));
        }
        self.effect.validate()
    }

    /// Serializable description of this step.
    pub fn describe(&self) -> StepDescription {
        StepDescription {
            probability: self.probability,
            effect: self.effect.metadata(),
        }
    }
}

/// Listing form of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescription {
    pub probability: f64,
    pub effect: EffectMetadata,
}

/// Ordered sequence of probabilistic steps.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step (builder style).
    pub fn step(mut self, effect: impl Effect + 'static, probability: f64) -> Self {
        self.steps.push(Step::new(effect, probability));
        self
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Effect ids in application order.
    pub fn effect_ids(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.effect.metadata().id).collect()
    }

    /// Validate every step, stopping at the first problem.
    pub fn validate(&self) -> Result<(), EffectError> {
        self.steps.iter().try_for_each(Step::validate)
    }

    /// Describe every step.
    pub fn describe(&self) -> Vec<StepDescription> {
        self.steps.iter().map(Step::describe).collect()
    }

    /// Apply the pipeline to `source`, returning a new image of the same size.
    ///
    /// `source` is never modified, so the same pipeline can be re-applied to
    /// it for a fresh random draw.
    pub fn apply(&self, source: &Image, rng: &mut RequestRng) -> Image {
        let mut working = source.clone();
        for step in &self.steps {
            if chance(rng, step.probability) {
                step.effect.apply(&mut working, rng);
            }
        }
        working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::request_rng;
    use crate::effects::test_support::{flat, textured};
    use crate::effects::{BrightnessContrast, MotionBlur};

    #[test]
    fn test_builder_order() {
        let pipeline = Pipeline::new()
            .step(BrightnessContrast::symmetric(0.1, 0.1), 1.0)
            .step(MotionBlur::new(5), 0.5);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.effect_ids(), vec!["brightness_contrast", "motion_blur"]);
        assert_eq!(pipeline.steps()[1].probability(), 0.5);
    }

    #[test]
    fn test_zero_probability_is_noop() {
        let pipeline = Pipeline::new()
            .step(BrightnessContrast::symmetric(0.5, 0.5), 0.0)
            .step(MotionBlur::new(11), 0.0);
        let source = textured(32, 32);
        let mut rng = request_rng(Some(1));
        assert_eq!(pipeline.apply(&source, &mut rng), source);
    }

    #[test]
    fn test_steps_compose_on_working_image() {
        // Two fixed darkenings of -0.2 each must stack.
        let darken = BrightnessContrast::symmetric(0.0, 0.0).with_brightness_range(-0.2, -0.2);
        let pipeline = Pipeline::new().step(darken.clone(), 1.0).step(darken, 1.0);
        let source = flat(4, 4, 200);
        let mut rng = request_rng(None);
        let out = pipeline.apply(&source, &mut rng);
        assert!(out.pixels().all(|p| p.0 == [98, 98, 98]));
        assert_eq!(source.get_pixel(0, 0).0, [200, 200, 200]);
    }

    #[test]
    fn test_reapply_draws_fresh_randomness() {
        let pipeline = Pipeline::new().step(BrightnessContrast::symmetric(0.4, 0.3), 1.0);
        let source = textured(16, 16);
        let mut rng = request_rng(Some(8));
        let first = pipeline.apply(&source, &mut rng);
        let second = pipeline.apply(&source, &mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn test_validate_probability() {
        let pipeline = Pipeline::new().step(MotionBlur::new(5), 1.5);
        assert_eq!(pipeline.validate(), Err(EffectError::InvalidProbability(1.5)));

        let pipeline = Pipeline::new().step(MotionBlur::new(6), 0.5);
        assert!(matches!(pipeline.validate(), Err(EffectError::InvalidKernel { .. })));
    }

    #[test]
    fn test_describe() {
        let pipeline = Pipeline::new().step(MotionBlur::new(7), 0.4);
        let described = pipeline.describe();
        assert_eq!(described.len(), 1);
        assert_eq!(described[0].probability, 0.4);
        assert_eq!(described[0].effect.id, "motion_blur");
    }
}
