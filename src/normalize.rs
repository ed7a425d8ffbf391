//! Post-processing of decoded model output.
//!
//! Decoded text still carries the tokenizer's reserved tokens plus the two
//! structural markers the model was trained to emit. The normalizer deletes
//! the former and remaps the latter to display delimiters.

use crate::config::MarkerConfig;
use crate::types::TextBatch;

/// Strips reserved tokens and remaps structural markers in decoded text.
///
/// The strip set and the remap table are distinct: the strip set is the
/// full special-token list reported by the live tokenizer, while the remap
/// table holds the two structural markers. The constructor removes any
/// remap key from the strip set, so a marker can never be deleted by the
/// generic strip pass before it is remapped.
#[derive(Debug, Clone)]
pub struct TokenNormalizer {
    strip: Vec<String>,
    remap: Vec<(String, String)>,
}

impl TokenNormalizer {
    /// Build a normalizer from the tokenizer's special-token list and the
    /// configured markers.
    pub fn new(special_tokens: &[String], markers: &MarkerConfig) -> Self {
        let remap = vec![
            (
                markers.section_token.clone(),
                markers.section_replacement.clone(),
            ),
            (
                markers.separator_token.clone(),
                markers.separator_replacement.clone(),
            ),
        ];

        let strip = special_tokens
            .iter()
            .filter(|token| !remap.iter().any(|(marker, _)| marker == *token))
            .cloned()
            .collect();

        Self { strip, remap }
    }

    /// Normalize one decoded string: delete every reserved token, then
    /// remap the structural markers.
    pub fn normalize(&self, text: &str) -> String {
        let mut text = text.to_string();

        for token in &self.strip {
            text = text.replace(token, "");
        }

        for (marker, replacement) in &self.remap {
            text = text.replace(marker, replacement);
        }

        text
    }

    /// Normalize a single string or a batch; arity is normalized to a list
    /// before processing, and output order matches input order 1:1.
    pub fn normalize_batch(&self, texts: impl Into<TextBatch>) -> Vec<String> {
        texts
            .into()
            .into_vec()
            .iter()
            .map(|text| self.normalize(text))
            .collect()
    }

    /// Tokens deleted by the strip pass.
    pub fn strip_set(&self) -> &[String] {
        &self.strip
    }
}
