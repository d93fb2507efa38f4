//! Error types for Augmentor.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Separate client mistakes (bad source, unknown recipe) from server faults
//! - Carry enough detail to be rendered directly in an API response
//! - Convert into the top-level [`AugmentError`] with `?`

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for an augmentation request.
///
/// Every failure aborts the request; no partial batch is ever returned.
#[derive(Error, Debug)]
pub enum AugmentError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("unknown recipe '{0}'")]
    UnknownRecipe(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid effect parameters: {0}")]
    InvalidEffect(#[from] EffectError),
}

/// Failures while acquiring and decoding the source image.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("source responded with status {status}")]
    Status { status: u16 },

    #[error("source body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("source image has zero area")]
    EmptyImage,
}

/// Failures while serializing an output image.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("jpeg encode failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Invalid parameters on a transform step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("{effect}: kernel size {size} must be odd and at least 3")]
    InvalidKernel { effect: &'static str, size: u32 },

    #[error("{effect}: range for '{parameter}' is empty ({low} > {high})")]
    EmptyRange {
        effect: &'static str,
        parameter: &'static str,
        low: f64,
        high: f64,
    },

    #[error("{effect}: '{parameter}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        effect: &'static str,
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("step probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

/// Failures while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl AugmentError {
    /// Whether the caller is at fault (surfaced as a 4xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AugmentError::Fetch(_) | AugmentError::UnknownRecipe(_) | AugmentError::InvalidRequest(_)
        )
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AugmentError::Fetch(_) => "fetch_failed",
            AugmentError::Encode(_) => "encode_failed",
            AugmentError::UnknownRecipe(_) => "unknown_recipe",
            AugmentError::InvalidRequest(_) => "invalid_request",
            AugmentError::InvalidEffect(_) => "invalid_effect",
        }
    }
}

impl EffectError {
    /// Check a closed range `[low, high]` is non-empty.
    pub fn check_range(
        effect: &'static str,
        parameter: &'static str,
        (low, high): (f64, f64),
    ) -> Result<(), EffectError> {
        if low > high {
            return Err(EffectError::EmptyRange {
                effect,
                parameter,
                low,
                high,
            });
        }
        Ok(())
    }

    /// Check `value` lies within `[min, max]`.
    pub fn check_bounds(
        effect: &'static str,
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), EffectError> {
        if !(min..=max).contains(&value) {
            return Err(EffectError::OutOfRange {
                effect,
                parameter,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Result type alias for augmentation operations.
pub type AugmentResult<T> = Result<T, AugmentError>;
