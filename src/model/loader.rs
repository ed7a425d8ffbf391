//! Loading of model and tokenizer artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::t5;
use hf_hub::api::sync::Api;
use tracing::info;

use crate::config::{EngineConfig, ModelConfig};
use crate::error::{EngineError, Result};

use super::generation::RecipeModel;
use super::tokenizer::RecipeTokenizer;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Resolved locations of the three artifacts the engine needs.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Path to the model's `config.json`.
    pub config: PathBuf,
    /// Path to `tokenizer.json`.
    pub tokenizer: PathBuf,
    /// Path to the safetensors weights.
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Point at artifacts inside a local model directory.
    pub fn local(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        }
    }

    /// Fetch artifacts from the Hugging Face hub into the local cache and
    /// return their cached paths.
    pub fn fetch(repo_id: &str) -> Result<Self> {
        info!(repo = repo_id, "fetching model artifacts from the hub");
        let api = Api::new().map_err(EngineError::initialization)?;
        let repo = api.model(repo_id.to_string());

        Ok(Self {
            config: repo.get(CONFIG_FILE).map_err(EngineError::initialization)?,
            tokenizer: repo
                .get(TOKENIZER_FILE)
                .map_err(EngineError::initialization)?,
            weights: repo.get(WEIGHTS_FILE).map_err(EngineError::initialization)?,
        })
    }

    /// Resolve per the configured source: a local directory when one is
    /// set, the hub repo otherwise.
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        if !config.model_path.as_os_str().is_empty() {
            return Ok(Self::local(&config.model_path));
        }

        match &config.hub_repo {
            Some(repo) => Self::fetch(repo),
            None => Err(EngineError::Configuration {
                message: "no model source configured".to_string(),
                parameter: "model_path".to_string(),
            }),
        }
    }
}

/// The loaded tokenizer and model, ready to generate.
pub struct ModelAssets {
    /// Tokenizer bridge with the fixed input width applied.
    pub tokenizer: RecipeTokenizer,
    /// The conditional-generation model.
    pub model: RecipeModel,
}

impl ModelAssets {
    /// Load all artifacts onto the given device. Failures are fatal; there
    /// is no retry or partial load.
    pub fn load(config: &EngineConfig, device: &Device) -> Result<Self> {
        let files = ModelFiles::resolve(&config.model)?;

        let t5_config: t5::Config = serde_json::from_str(&fs::read_to_string(&files.config)?)?;

        let tokenizer = RecipeTokenizer::from_file(
            &files.tokenizer,
            config.model.max_input_length,
            Some(t5_config.pad_token_id as u32),
        )?;

        info!(weights = %files.weights.display(), "loading model weights");
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, device)?
        };
        let model = t5::T5ForConditionalGeneration::load(vb, &t5_config)?;

        Ok(Self {
            tokenizer,
            model: RecipeModel::new(model, t5_config, device.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_local_files_join_the_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = ModelFiles::local(dir.path());
        assert_eq!(files.config, dir.path().join("config.json"));
        assert_eq!(files.tokenizer, dir.path().join("tokenizer.json"));
        assert_eq!(files.weights, dir.path().join("model.safetensors"));
    }

    #[test]
    fn test_resolve_prefers_local_path() {
        let config = ModelConfig {
            model_path: PathBuf::from("/models/recipe"),
            hub_repo: Some("flax-community/t5-recipe-generation".to_string()),
            max_input_length: 256,
        };
        let files = ModelFiles::resolve(&config).unwrap();
        assert_eq!(files.weights, PathBuf::from("/models/recipe/model.safetensors"));
    }

    #[test]
    fn test_resolve_without_source_fails() {
        let config = ModelConfig {
            model_path: PathBuf::new(),
            hub_repo: None,
            max_input_length: 256,
        };
        assert!(ModelFiles::resolve(&config).is_err());
    }
}
