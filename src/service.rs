//! Request handling shared by the HTTP server and the command line.

use crate::core::error::{AugmentError, AugmentResult};
use crate::core::types::{Image, JPEG_QUALITY, MAX_SIDE};
use crate::effects::bound_longest_side;
use crate::generator::{VariantGenerator, MAX_VARIANTS, MIN_VARIANTS};
use crate::io::{acquire, to_data_url, ImageSource};
use crate::recipes::RecipeKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

fn default_recipe() -> String {
    RecipeKind::WeatherBasic.name().to_string()
}

fn default_count() -> i64 {
    10
}

/// Body of an augmentation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentRequest {
    /// URL (or, from the command line, path) of the source image.
    pub src_url: String,
    #[serde(default = "default_recipe")]
    pub recipe: String,
    #[serde(default = "default_count")]
    pub count: i64,
    #[serde(default)]
    pub seed: Option<i64>,
}

impl AugmentRequest {
    pub fn new(src_url: impl Into<String>) -> Self {
        Self {
            src_url: src_url.into(),
            recipe: default_recipe(),
            count: default_count(),
            seed: None,
        }
    }

    pub fn recipe(mut self, recipe: impl Into<String>) -> Self {
        self.recipe = recipe.into();
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn seed(mut self, seed: Option<i64>) -> Self {
        self.seed = seed;
        self
    }

    /// Reject requests outside the accepted boundary.
    pub fn validate(&self) -> AugmentResult<()> {
        if self.src_url.trim().is_empty() {
            return Err(AugmentError::InvalidRequest("srcUrl must not be empty".to_string()));
        }
        let allowed = MIN_VARIANTS as i64..=MAX_VARIANTS as i64;
        if !allowed.contains(&self.count) {
            return Err(AugmentError::InvalidRequest(format!(
                "count must be between {MIN_VARIANTS} and {MAX_VARIANTS}, got {}",
                self.count
            )));
        }
        Ok(())
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentResponse {
    #[serde(rename = "outputsBase64")]
    pub outputs_base64: Vec<String>,
}

/// Validates, fetches, generates and encodes.
#[derive(Clone)]
pub struct Augmentor {
    source: Arc<dyn ImageSource>,
    generator: VariantGenerator,
}

impl Augmentor {
    pub fn new(source: Arc<dyn ImageSource>, generator: VariantGenerator) -> Self {
        Self { source, generator }
    }

    pub fn generator(&self) -> &VariantGenerator {
        &self.generator
    }

    /// Fetch, decode and bound the source image.
    pub fn load_source(&self, reference: &str) -> AugmentResult<Image> {
        let image = acquire(self.source.as_ref(), reference)?;
        Ok(bound_longest_side(image, MAX_SIDE))
    }

    /// Run `request` and return the generated variants as images.
    pub fn generate(&self, request: &AugmentRequest) -> AugmentResult<Vec<Image>> {
        request.validate()?;
        // Fail on an unknown recipe before any network work.
        let kind: RecipeKind = request.recipe.parse()?;
        let source = self.load_source(&request.src_url)?;
        self.generator
            .generate(&source, kind.name(), request.count, request.seed)
    }

    /// Run `request` and encode every variant for transport.
    pub fn handle(&self, request: &AugmentRequest) -> AugmentResult<AugmentResponse> {
        let request_id = Uuid::new_v4();
        log::info!(
            "[{request_id}] augment recipe={} count={} seed={:?}",
            request.recipe,
            request.count,
            request.seed
        );

        let result = self.generate(request).and_then(|variants| {
            variants
                .iter()
                .map(|variant| to_data_url(variant, JPEG_QUALITY).map_err(AugmentError::from))
                .collect::<AugmentResult<Vec<_>>>()
        });

        match result {
            Ok(outputs_base64) => {
                log::info!("[{request_id}] produced {} variants", outputs_base64.len());
                Ok(AugmentResponse { outputs_base64 })
            }
            Err(e) => {
                log::warn!("[{request_id}] failed: {e}");
                Err(e)
            }
        }
    }
}
