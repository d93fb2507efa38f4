//! Service configuration.
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file at all) yields a working configuration.

use crate::core::error::ConfigError;
use crate::quality::QualityGuard;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentorConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Source image acquisition.
    pub fetch: FetchConfig,
    /// Quality guard thresholds.
    pub quality: QualityConfig,
    /// Logging defaults (overridden by `RUST_LOG`).
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

/// Source image acquisition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout for HTTP sources.
    pub timeout_secs: u64,
    /// Largest accepted source body.
    pub max_bytes: u64,
    /// User agent sent to HTTP sources.
    pub user_agent: String,
}

impl FetchConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_bytes: 32 * 1024 * 1024,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

/// Quality guard thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Laplacian variance below which a candidate is too blurry.
    pub blur_threshold: f64,
    /// Mean HSV value below which a candidate is too dark.
    pub dark_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        let guard = QualityGuard::default();
        Self {
            blur_threshold: guard.blur_threshold,
            dark_threshold: guard.dark_threshold,
        }
    }
}

impl From<QualityConfig> for QualityGuard {
    fn from(config: QualityConfig) -> Self {
        QualityGuard {
            blur_threshold: config.blur_threshold,
            dark_threshold: config.dark_threshold,
        }
    }
}

/// Logging defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "augmentor=debug").
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AugmentorConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
