//! Core types shared by every stage of the augmentation pipeline.
//!
//! This module contains:
//! - The image type and frame helpers
//! - Request-scoped randomness
//! - Configuration
//! - Error types

pub mod config;
pub mod error;
pub mod rng;
pub mod types;

// Re-export commonly used types
pub use config::AugmentorConfig;
pub use error::{AugmentError, AugmentResult, ConfigError, EffectError, EncodeError, FetchError};
pub use rng::{request_rng, RequestRng};
pub use types::{Image, Roi, JPEG_QUALITY, MAX_SIDE};
