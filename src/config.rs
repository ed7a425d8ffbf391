//! Engine configuration.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level configuration for the recipe engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where to find the model and tokenizer artifacts.
    pub model: ModelConfig,
    /// Sampling parameters for the generation loop.
    pub generation: GenerationConfig,
    /// Marker tokens remapped to display delimiters after decoding.
    pub markers: MarkerConfig,
}

/// Location and shape of the pretrained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Local directory holding `config.json`, `tokenizer.json` and
    /// `model.safetensors`.
    pub model_path: PathBuf,

    /// Hugging Face model id to fetch artifacts from when no local
    /// directory is configured.
    pub hub_repo: Option<String>,

    /// Fixed input width; prompts are padded or truncated to this many
    /// tokens as one batch operation.
    pub max_input_length: usize,
}

/// Parameters controlling the model's sampling behavior. Fixed at engine
/// build time; never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum output sequence length, decoder start token included.
    pub max_length: usize,

    /// Minimum output sequence length; EOS is suppressed below this.
    pub min_length: usize,

    /// Forbid any n-gram of this size from recurring in the output.
    /// Zero disables the constraint.
    pub no_repeat_ngram_size: usize,

    /// Sample stochastically instead of taking the argmax.
    pub do_sample: bool,

    /// Restrict sampling to the k most likely tokens.
    pub top_k: Option<usize>,

    /// Nucleus sampling threshold.
    pub top_p: f64,

    /// Softmax temperature.
    pub temperature: f64,

    /// Seed for the sampling RNG.
    pub seed: u64,
}

/// The two reserved markers the model emits for recipe structure, and the
/// human-readable delimiters they become.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Marker separating recipe sections.
    pub section_token: String,
    /// What the section marker becomes in display text.
    pub section_replacement: String,
    /// Marker separating items within a section.
    pub separator_token: String,
    /// What the item separator becomes in display text.
    pub separator_replacement: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            hub_repo: None,
            max_input_length: 256,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 512,
            min_length: 64,
            no_repeat_ngram_size: 3,
            do_sample: true,
            top_k: Some(60),
            top_p: 0.95,
            temperature: 1.0,
            seed: 299792458,
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            section_token: "<section>".to_string(),
            section_replacement: "\n".to_string(),
            separator_token: "<sep>".to_string(),
            separator_replacement: "--".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
            markers: MarkerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check configuration consistency before building an engine.
    pub fn validate(&self) -> Result<()> {
        if self.model.model_path.as_os_str().is_empty() && self.model.hub_repo.is_none() {
            return Err(EngineError::Configuration {
                message: "either a local model path or a hub repo is required".to_string(),
                parameter: "model_path".to_string(),
            });
        }

        if self.model.max_input_length == 0 {
            return Err(EngineError::Configuration {
                message: "input width must be positive".to_string(),
                parameter: "max_input_length".to_string(),
            });
        }

        if self.generation.max_length < self.generation.min_length {
            return Err(EngineError::Configuration {
                message: "max_length must be at least min_length".to_string(),
                parameter: "max_length".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(EngineError::Configuration {
                message: "top_p must be between 0 and 1".to_string(),
                parameter: "top_p".to_string(),
            });
        }

        if self.generation.temperature <= 0.0 {
            return Err(EngineError::Configuration {
                message: "temperature must be positive".to_string(),
                parameter: "temperature".to_string(),
            });
        }

        self.markers.validate()
    }
}

impl MarkerConfig {
    /// Both markers must be present and distinct, otherwise the strip and
    /// remap passes of the normalizer cannot be kept consistent.
    pub fn validate(&self) -> Result<()> {
        if self.section_token.is_empty() || self.separator_token.is_empty() {
            return Err(EngineError::Configuration {
                message: "marker tokens must not be empty".to_string(),
                parameter: "markers".to_string(),
            });
        }

        if self.section_token == self.separator_token {
            return Err(EngineError::Configuration {
                message: "section and separator markers must differ".to_string(),
                parameter: "markers".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.model.max_input_length, 256);
        assert_eq!(config.generation.max_length, 512);
        assert_eq!(config.generation.min_length, 64);
        assert_eq!(config.generation.no_repeat_ngram_size, 3);
        assert_eq!(config.generation.top_k, Some(60));
        assert!(config.generation.do_sample);
        assert_eq!(config.markers.section_token, "<section>");
        assert_eq!(config.markers.separator_token, "<sep>");
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.model.model_path = PathBuf::from("/path/to/model");
        assert!(config.validate().is_ok());

        config.generation.top_p = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_requires_model_source() {
        let config = EngineConfig::default();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.model.hub_repo = Some("flax-community/t5-recipe-generation".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_marker_validation_rejects_duplicates() {
        let mut config = EngineConfig::default();
        config.model.model_path = PathBuf::from("/path/to/model");
        config.markers.separator_token = "<section>".to_string();
        assert!(config.validate().is_err());
    }
}
