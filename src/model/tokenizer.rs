//! Fixed-width batch tokenization.

use std::path::Path;
use tokenizers::Tokenizer as HfTokenizer;
use tracing::debug;

use crate::error::{EngineError, Result};

use super::FALLBACK_PAD_ID;

/// Wrapper around the HuggingFace tokenizer that encodes prompt batches to
/// a fixed width and decodes model output without touching special tokens.
pub struct RecipeTokenizer {
    tokenizer: HfTokenizer,
    special_tokens: Vec<String>,
    pad_token_id: u32,
    max_input_length: usize,
}

/// Batch encoding result. Every row is exactly `max_input_length` wide;
/// attention masks mark real tokens with 1 and padding with 0.
#[derive(Debug, Clone)]
pub struct EncodingBatch {
    /// Fixed-width token rows, one per input.
    pub token_ids: Vec<Vec<u32>>,
    /// 1 for real tokens, 0 for padding.
    pub attention_masks: Vec<Vec<u32>>,
    /// Unpadded length of each sequence, capped at the fixed width.
    pub sequence_lengths: Vec<usize>,
}

impl EncodingBatch {
    /// Number of sequences in the batch.
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    /// True when the batch holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}

impl RecipeTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// `model_pad_id` is the pad id from the model config, used when the
    /// tokenizer vocabulary has no `<pad>` entry.
    pub fn from_file(
        path: impl AsRef<Path>,
        max_input_length: usize,
        model_pad_id: Option<u32>,
    ) -> Result<Self> {
        let tokenizer = HfTokenizer::from_file(path.as_ref()).map_err(EngineError::tokenizer)?;

        let mut special_tokens: Vec<String> = tokenizer
            .get_added_tokens_decoder()
            .into_iter()
            .filter(|(_, token)| token.special)
            .map(|(_, token)| token.content)
            .collect();
        special_tokens.sort();
        special_tokens.dedup();

        let pad_token_id = tokenizer
            .token_to_id("<pad>")
            .or(model_pad_id)
            .unwrap_or(FALLBACK_PAD_ID);

        debug!(
            special_tokens = special_tokens.len(),
            pad_token_id, max_input_length, "tokenizer loaded"
        );

        Ok(Self {
            tokenizer,
            special_tokens,
            pad_token_id,
            max_input_length,
        })
    }

    /// Encode a batch of formatted prompts to fixed-width token rows.
    ///
    /// Padding and truncation happen uniformly over the whole batch: every
    /// sequence is truncated to the configured width, then right-padded
    /// with the pad id up to that same width.
    pub fn encode_batch(&self, texts: &[String]) -> Result<EncodingBatch> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(EngineError::tokenizer)?;

        let width = self.max_input_length;
        let mut token_ids = Vec::with_capacity(encodings.len());
        let mut attention_masks = Vec::with_capacity(encodings.len());
        let mut sequence_lengths = Vec::with_capacity(encodings.len());

        for encoding in &encodings {
            let (ids, mask) = pad_to_width(encoding.get_ids(), width, self.pad_token_id);
            sequence_lengths.push(encoding.get_ids().len().min(width));
            token_ids.push(ids);
            attention_masks.push(mask);
        }

        Ok(EncodingBatch {
            token_ids,
            attention_masks,
            sequence_lengths,
        })
    }

    /// Decode output token sequences back to text, keeping special tokens.
    /// Stripping reserved tokens is the normalizer's job, not the decoder's.
    pub fn decode_batch(&self, sequences: &[Vec<u32>]) -> Result<Vec<String>> {
        let refs: Vec<&[u32]> = sequences.iter().map(|seq| seq.as_slice()).collect();
        self.tokenizer
            .decode_batch(&refs, false)
            .map_err(EngineError::tokenizer)
    }

    /// Full special-token list reported by the tokenizer. Feeds the
    /// normalizer's strip set.
    pub fn special_tokens(&self) -> &[String] {
        &self.special_tokens
    }

    /// Pad id used for fixed-width encoding.
    pub fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }

    /// Configured fixed input width.
    pub fn max_input_length(&self) -> usize {
        self.max_input_length
    }
}

/// Truncate `ids` to `width` tokens, then right-pad with `pad_id` up to
/// `width`. Returns the padded row and its attention mask.
fn pad_to_width(ids: &[u32], width: usize, pad_id: u32) -> (Vec<u32>, Vec<u32>) {
    let real = ids.len().min(width);
    let mut row: Vec<u32> = ids[..real].to_vec();
    let mut mask = vec![1u32; real];
    row.resize(width, pad_id);
    mask.resize(width, 0);
    (row, mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_sequence_is_right_padded() {
        let (row, mask) = pad_to_width(&[5, 6, 7], 6, 0);
        assert_eq!(row, vec![5, 6, 7, 0, 0, 0]);
        assert_eq!(mask, vec![1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_long_sequence_is_truncated() {
        let (row, mask) = pad_to_width(&[1, 2, 3, 4, 5], 3, 0);
        assert_eq!(row, vec![1, 2, 3]);
        assert_eq!(mask, vec![1, 1, 1]);
    }

    #[test]
    fn test_exact_width_is_untouched() {
        let (row, mask) = pad_to_width(&[9, 9], 2, 0);
        assert_eq!(row, vec![9, 9]);
        assert_eq!(mask, vec![1, 1]);
    }

    #[test]
    fn test_empty_sequence_is_all_padding() {
        let (row, mask) = pad_to_width(&[], 4, 7);
        assert_eq!(row, vec![7, 7, 7, 7]);
        assert_eq!(mask, vec![0, 0, 0, 0]);
    }
}
