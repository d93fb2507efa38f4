//! Transform step vocabulary.
//!
//! Every perturbation a recipe can apply implements the [`Effect`] trait. The
//! trait uses the same two-phase design throughout:
//!
//! 1. **Validation** (`validate`): checks parameters once, when a pipeline is
//!    built. Catches impossible kernels or empty ranges before any pixel work.
//! 2. **Application** (`apply`): mutates the working image in place, drawing
//!    all randomness from the request RNG in a fixed order.
//!
//! Effects are grouped by concern:
//! - [`color`]: brightness/contrast
//! - [`blur`]: motion blur
//! - [`weather`]: rain and fog overlays
//! - [`light`]: shadow and sun flare overlays
//! - [`transform`]: downscale and size bounding

pub mod blur;
pub mod color;
pub mod draw;
pub mod light;
pub mod transform;
pub mod weather;

pub use blur::MotionBlur;
pub use color::BrightnessContrast;
pub use light::{Shadow, SunFlare};
pub use transform::{bound_longest_side, Downscale};
pub use weather::{Fog, Rain};

use crate::core::error::EffectError;
use crate::core::rng::RequestRng;
use crate::core::types::Image;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category for organizing effects in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Global tone adjustments
    Color,
    /// Blur effects
    Blur,
    /// Precipitation and haze overlays
    Weather,
    /// Light and shade overlays
    Lighting,
    /// Resolution changes
    Transform,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Color => "Color",
            Category::Blur => "Blur",
            Category::Weather => "Weather",
            Category::Lighting => "Lighting",
            Category::Transform => "Transform",
        }
    }
}

/// A parameter value as reported in effect metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Float(f64),
    Integer(i64),
    Range(f64, f64),
    IntRange(i64, i64),
    Region([f64; 4]),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{v:.3}"),
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Range(lo, hi) => write!(f, "[{lo:.3}, {hi:.3}]"),
            ParamValue::IntRange(lo, hi) => write!(f, "[{lo}, {hi}]"),
            ParamValue::Region([x0, y0, x1, y1]) => {
                write!(f, "({x0:.2}, {y0:.2})-({x1:.2}, {y1:.2})")
            }
        }
    }
}

/// Metadata describing an effect instance and its concrete parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectMetadata {
    /// Unique identifier for this effect type (e.g., "motion_blur")
    pub id: String,
    /// Human-readable name (e.g., "Motion Blur")
    pub name: String,
    /// Category for listings
    pub category: Category,
    /// Short description
    pub description: String,
    /// Concrete parameter values of this instance
    pub parameters: Vec<(String, ParamValue)>,
}

impl EffectMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> EffectMetadataBuilder {
        EffectMetadataBuilder::new(id, name)
    }

    /// Find a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }
}

/// Builder for EffectMetadata.
pub struct EffectMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    parameters: Vec<(String, ParamValue)>,
}

impl EffectMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::Color,
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Record a parameter value.
    pub fn parameter(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.parameters.push((name.into(), value));
        self
    }

    /// Build the metadata.
    pub fn build(self) -> EffectMetadata {
        EffectMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            parameters: self.parameters,
        }
    }
}

/// The core trait for transform steps.
///
/// # Determinism
///
/// `apply` must take every random decision from `rng` and nowhere else, and
/// must make the same sequence of draws for the same parameters and image
/// size. That keeps a whole batch reproducible from a single seed.
///
/// # Thread Safety
///
/// `Send + Sync` bounds let pipelines move into blocking worker threads.
pub trait Effect: Send + Sync + fmt::Debug {
    /// Get the metadata for this effect instance.
    fn metadata(&self) -> EffectMetadata;

    /// Validate parameters before the effect is used.
    fn validate(&self) -> Result<(), EffectError> {
        Ok(())
    }

    /// Apply the effect to the working image in place.
    ///
    /// The image keeps its dimensions.
    fn apply(&self, image: &mut Image, rng: &mut RequestRng);

    /// Clone this effect into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Effect>;
}

impl Clone for Box<dyn Effect> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let metadata = EffectMetadata::builder("rain", "Rain")
            .category(Category::Weather)
            .description("Rain streaks")
            .parameter("drop_length", ParamValue::Integer(15))
            .build();

        assert_eq!(metadata.id, "rain");
        assert_eq!(metadata.category, Category::Weather);
        assert_eq!(metadata.get_parameter("drop_length"), Some(&ParamValue::Integer(15)));
        assert_eq!(metadata.get_parameter("missing"), None);
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Integer(9).to_string(), "9");
        assert_eq!(ParamValue::Range(-0.25, 0.05).to_string(), "[-0.250, 0.050]");
        assert_eq!(ParamValue::IntRange(3, 11).to_string(), "[3, 11]");
    }

    #[test]
    fn test_boxed_effect_clone() {
        let effect: Box<dyn Effect> = Box::new(MotionBlur::new(7));
        let copy = effect.clone();
        assert_eq!(effect.metadata(), copy.metadata());
    }
}
