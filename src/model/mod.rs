//! Model module bridging the tokenizer and the candle T5 runtime.

mod generation;
mod loader;
mod tokenizer;

pub use generation::{GeneratedSequence, RecipeModel};
pub use loader::{ModelAssets, ModelFiles};
pub use tokenizer::{EncodingBatch, RecipeTokenizer};

/// Pad id used when neither the tokenizer nor the model config reports one.
pub(crate) const FALLBACK_PAD_ID: u32 = 0;
