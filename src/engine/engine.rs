use std::sync::Arc;
use std::time::Instant;

use candle_core::Device;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{GeneratedSequence, RecipeModel, RecipeTokenizer};
use crate::normalize::TokenNormalizer;
use crate::prompt;
use crate::types::{RecipeText, TextBatch};

use super::builder::EngineBuilder;
use super::Generator;

/// Main entry point: turns raw ingredient lists into normalized recipes.
///
/// The tokenizer and normalizer are read-only after build. The model's
/// decoder cache is the only mutable state and is serialized behind a
/// mutex, so generation requests run one at a time.
pub struct RecipeEngine {
    config: Arc<EngineConfig>,
    tokenizer: Arc<RecipeTokenizer>,
    model: Arc<Mutex<RecipeModel>>,
    normalizer: Arc<TokenNormalizer>,
    device: Device,
}

/// Summary of the engine's configuration and state.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    /// Local model directory, empty when loading from the hub.
    pub model_path: std::path::PathBuf,
    /// Fixed input width applied during batch encoding.
    pub max_input_length: usize,
    /// Upper bound on generated sequence length.
    pub max_output_length: usize,
    /// Whether the engine runs on a CUDA device.
    pub cuda: bool,
}

impl RecipeEngine {
    /// Create a new engine builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn new(
        config: Arc<EngineConfig>,
        tokenizer: Arc<RecipeTokenizer>,
        model: Arc<Mutex<RecipeModel>>,
        normalizer: Arc<TokenNormalizer>,
        device: Device,
    ) -> Self {
        Self {
            config,
            tokenizer,
            model,
            normalizer,
            device,
        }
    }

    /// Generate one recipe per input.
    ///
    /// Accepts a single input or a batch; a single input behaves exactly
    /// like a one-element batch. An empty batch returns an empty result
    /// without touching the model. Errors from the tokenizer or the model
    /// propagate to the caller; there are no retries and no partial
    /// results.
    pub async fn generate(&self, inputs: impl Into<TextBatch>) -> Result<Vec<RecipeText>> {
        let inputs = inputs.into().into_vec();
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let prompts = prompt::format_prompts(&inputs);
        debug!(batch_size = prompts.len(), "encoding prompt batch");
        let batch = self.tokenizer.encode_batch(&prompts)?;

        let sequences = {
            let mut model = self.model.lock().await;
            model.generate_batch(&batch, &self.config.generation)?
        };

        let token_rows: Vec<Vec<u32>> = sequences.iter().map(|s| s.tokens.clone()).collect();
        let decoded = self.tokenizer.decode_batch(&token_rows)?;
        let normalized = self.normalizer.normalize_batch(decoded);

        info!(
            batch_size = inputs.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generation complete"
        );

        Ok(assemble_recipes(normalized, sequences))
    }

    /// Get information about the engine's configuration and device.
    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            model_path: self.config.model.model_path.clone(),
            max_input_length: self.config.model.max_input_length,
            max_output_length: self.config.generation.max_length,
            cuda: self.device.is_cuda(),
        }
    }
}

#[async_trait::async_trait]
impl Generator for RecipeEngine {
    async fn generate(&self, inputs: TextBatch) -> Result<Vec<RecipeText>> {
        RecipeEngine::generate(self, inputs).await
    }
}

/// Pair each normalized text with its sequence's token count and timing,
/// preserving result order.
fn assemble_recipes(normalized: Vec<String>, sequences: Vec<GeneratedSequence>) -> Vec<RecipeText> {
    normalized
        .into_iter()
        .zip(sequences)
        .map(|(text, sequence)| RecipeText {
            text,
            token_count: sequence.tokens.len(),
            processing_time: sequence.elapsed,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_each_recipe_keeps_its_own_timing() {
        let sequences = vec![
            GeneratedSequence {
                tokens: vec![0, 5, 1],
                elapsed: Duration::from_millis(10),
            },
            GeneratedSequence {
                tokens: vec![0, 5, 6, 7, 1],
                elapsed: Duration::from_millis(25),
            },
        ];
        let recipes = assemble_recipes(vec!["first".to_string(), "second".to_string()], sequences);

        assert_eq!(recipes[0].text, "first");
        assert_eq!(recipes[0].token_count, 3);
        assert_eq!(recipes[0].processing_time, Duration::from_millis(10));
        assert_eq!(recipes[1].token_count, 5);
        assert_eq!(recipes[1].processing_time, Duration::from_millis(25));
    }
}
