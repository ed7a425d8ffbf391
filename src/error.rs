//! Error types shared across the engine.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while building or running the recipe engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failures while locating or loading model artifacts.
    #[error("Initialization error: {message}")]
    Initialization {
        /// Human-readable description of what failed to come up.
        message: String,
    },

    /// Invalid or inconsistent configuration values.
    #[error("Configuration error for {parameter}: {message}")]
    Configuration {
        /// Description of the violated constraint.
        message: String,
        /// The offending configuration parameter.
        parameter: String,
    },

    /// Encode or decode failures from the tokenizer.
    #[error("Tokenizer error: {message}")]
    Tokenizer {
        /// Message reported by the tokenizer library.
        message: String,
    },

    /// Failures raised while running the model's generation loop.
    #[error("Generation error: {message}")]
    Generation {
        /// Description of the failed generation step.
        message: String,
    },

    /// Tensor and device errors surfaced by candle.
    #[error(transparent)]
    Tensor(#[from] candle_core::Error),

    /// Filesystem errors while reading model artifacts.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed model configuration files.
    #[error("Invalid model config: {0}")]
    ModelConfig(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn tokenizer(err: impl std::fmt::Display) -> Self {
        EngineError::Tokenizer {
            message: err.to_string(),
        }
    }

    pub(crate) fn initialization(err: impl std::fmt::Display) -> Self {
        EngineError::Initialization {
            message: err.to_string(),
        }
    }
}
