//! Engine module providing the main interface to recipe generation.

mod builder;
mod engine;

pub use builder::EngineBuilder;
pub use engine::{EngineInfo, RecipeEngine};

use crate::error::Result;
use crate::types::{RecipeText, TextBatch};

/// Trait covering the generation surface, useful for swapping in a stub
/// when the real model is too heavy for a test.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Generate one normalized recipe per input, order preserved.
    async fn generate(&self, inputs: TextBatch) -> Result<Vec<RecipeText>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct EchoGenerator;

    #[async_trait::async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, inputs: TextBatch) -> Result<Vec<RecipeText>> {
            Ok(inputs
                .into_vec()
                .into_iter()
                .map(|text| RecipeText {
                    text,
                    token_count: 0,
                    processing_time: Duration::default(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_single_input_yields_single_output() {
        let generator = EchoGenerator;
        let outputs = generator.generate("flour, water".into()).await.unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].text, "flour, water");
    }

    #[tokio::test]
    async fn test_single_matches_one_element_batch() {
        let generator = EchoGenerator;
        let single = generator.generate("flour".into()).await.unwrap();
        let wrapped = generator
            .generate(vec!["flour".to_string()].into())
            .await
            .unwrap();
        assert_eq!(single[0].text, wrapped[0].text);
    }
}
