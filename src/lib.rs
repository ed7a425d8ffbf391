//! Recipe Engine - ingredient-to-recipe generation with a pretrained
//! sequence-to-sequence model.
//!
//! The crate wraps a T5-style conditional-generation model: raw
//! comma-separated ingredient lists are prefixed into model prompts,
//! batch-encoded to a fixed width, run through the sampling loop, decoded
//! with special tokens intact, and finally normalized into sectioned
//! recipe text ready for display.

#![warn(missing_docs)]

// Public modules
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod render;
pub mod types;
pub mod utils;

// Internal modules
mod model;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for public API
pub use config::{EngineConfig, GenerationConfig, MarkerConfig, ModelConfig};
pub use engine::{EngineBuilder, Generator, RecipeEngine};
pub use error::{EngineError, Result};
pub use normalize::TokenNormalizer;
pub use types::{RecipeText, TextBatch};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_number() {
        assert!(!VERSION.is_empty());
    }
}
