//! Common type definitions used throughout the engine.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// A single raw input or an ordered batch of them.
///
/// Callers may hand the engine one ingredient list or several; both forms
/// are normalized to a list before any processing happens, so a single
/// input behaves exactly like a one-element batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextBatch {
    /// One raw input string.
    Single(String),
    /// An ordered sequence of raw input strings.
    Batch(Vec<String>),
}

impl TextBatch {
    /// Normalize to an owned list, preserving order.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TextBatch::Single(text) => vec![text],
            TextBatch::Batch(texts) => texts,
        }
    }

    /// Number of inputs carried.
    pub fn len(&self) -> usize {
        match self {
            TextBatch::Single(_) => 1,
            TextBatch::Batch(texts) => texts.len(),
        }
    }

    /// True when the batch carries no inputs at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for TextBatch {
    fn from(text: &str) -> Self {
        TextBatch::Single(text.to_string())
    }
}

impl From<String> for TextBatch {
    fn from(text: String) -> Self {
        TextBatch::Single(text)
    }
}

impl From<Vec<String>> for TextBatch {
    fn from(texts: Vec<String>) -> Self {
        TextBatch::Batch(texts)
    }
}

impl From<&[String]> for TextBatch {
    fn from(texts: &[String]) -> Self {
        TextBatch::Batch(texts.to_vec())
    }
}

impl From<Vec<&str>> for TextBatch {
    fn from(texts: Vec<&str>) -> Self {
        TextBatch::Batch(texts.into_iter().map(str::to_string).collect())
    }
}

/// One generated recipe after decoding and marker normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeText {
    /// Normalized recipe text with section breaks as newlines.
    pub text: String,
    /// Number of tokens the model produced for this recipe.
    pub token_count: usize,
    /// Wall-clock time spent generating this recipe.
    pub processing_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_normalizes_to_one_element_list() {
        let batch: TextBatch = "potato, onion".into();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.into_vec(), vec!["potato, onion".to_string()]);
    }

    #[test]
    fn test_batch_preserves_order() {
        let batch: TextBatch = vec!["a".to_string(), "b".to_string(), "c".to_string()].into();
        assert_eq!(batch.into_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_and_wrapped_single_are_equivalent() {
        let single: TextBatch = "salt".into();
        let wrapped: TextBatch = vec!["salt".to_string()].into();
        assert_eq!(single.into_vec(), wrapped.into_vec());
    }

    #[test]
    fn test_empty_batch() {
        let batch: TextBatch = Vec::<String>::new().into();
        assert!(batch.is_empty());
        assert!(batch.into_vec().is_empty());
    }
}
