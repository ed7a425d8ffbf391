use std::sync::Arc;

use candle_core::Device;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::ModelAssets;
use crate::normalize::TokenNormalizer;

use super::engine::RecipeEngine;

/// Builder for constructing a [`RecipeEngine`] instance.
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Replace the whole engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load model artifacts from a local directory.
    pub fn with_model_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.model.model_path = dir.into();
        self
    }

    /// Fetch model artifacts from a Hugging Face repo when no local
    /// directory is configured.
    pub fn with_hub_repo(mut self, repo: impl Into<String>) -> Self {
        self.config.model.hub_repo = Some(repo.into());
        self
    }

    /// Validate the configuration, load the model and tokenizer, and
    /// assemble the engine. Artifacts are loaded once; the engine holds
    /// them read-only for its lifetime.
    pub async fn build(self) -> Result<RecipeEngine> {
        self.config.validate()?;

        let config = Arc::new(self.config);
        let device = Device::cuda_if_available(0)?;
        info!(cuda = device.is_cuda(), "initializing recipe engine");

        let load_config = Arc::clone(&config);
        let load_device = device.clone();
        let assets = tokio::task::spawn_blocking(move || ModelAssets::load(&load_config, &load_device))
            .await
            .map_err(|e| EngineError::Initialization {
                message: format!("model load task failed: {}", e),
            })??;

        let normalizer = TokenNormalizer::new(assets.tokenizer.special_tokens(), &config.markers);

        Ok(RecipeEngine::new(
            config,
            Arc::new(assets.tokenizer),
            Arc::new(Mutex::new(assets.model)),
            Arc::new(normalizer),
            device,
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
