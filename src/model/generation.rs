//! The T5 conditional-generation loop.

use std::time::{Duration, Instant};

use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::t5;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::{EngineError, Result};

use super::tokenizer::EncodingBatch;

/// One generated token sequence and the time spent producing it.
#[derive(Debug, Clone)]
pub struct GeneratedSequence {
    /// Output token ids, decoder start and EOS included.
    pub tokens: Vec<u32>,
    /// Wall-clock time for this sequence's encode and decode passes.
    pub elapsed: Duration,
}

/// The pretrained recipe model plus the device it runs on.
///
/// The decoder's KV cache makes generation `&mut`; the engine serializes
/// access behind a mutex.
pub struct RecipeModel {
    model: t5::T5ForConditionalGeneration,
    config: t5::Config,
    device: Device,
}

impl RecipeModel {
    pub(crate) fn new(
        model: t5::T5ForConditionalGeneration,
        config: t5::Config,
        device: Device,
    ) -> Self {
        Self {
            model,
            config,
            device,
        }
    }

    /// Run generation over an encoded batch.
    ///
    /// Each sequence's encoder pass runs on its unpadded token ids, so
    /// real tokens never attend over padding embeddings; the tokenizer's
    /// fixed-width batch contract is unchanged upstream. The decoder loop
    /// runs per sequence, clearing the KV cache between sequences. Output
    /// order matches input order 1:1. Returned sequences keep the decoder
    /// start and EOS tokens; the normalizer strips them later.
    pub fn generate_batch(
        &mut self,
        batch: &EncodingBatch,
        params: &GenerationConfig,
    ) -> Result<Vec<GeneratedSequence>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let decoder_start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let eos_token_id = self.config.eos_token_id as u32;

        let mut sequences = Vec::with_capacity(batch.len());
        for index in 0..batch.len() {
            let start = Instant::now();

            let row = trim_padding(&batch.token_ids[index], batch.sequence_lengths[index]);
            let input_ids = Tensor::new(row, &self.device)?.unsqueeze(0)?;
            self.model.clear_kv_cache();
            let encoder_output = self.model.encode(&input_ids)?;

            let tokens = self.generate_one(&encoder_output, decoder_start, eos_token_id, params)?;
            debug!(
                sequence = index,
                prompt_tokens = batch.sequence_lengths[index],
                output_tokens = tokens.len(),
                "sequence generated"
            );
            sequences.push(GeneratedSequence {
                tokens,
                elapsed: start.elapsed(),
            });
        }

        Ok(sequences)
    }

    fn generate_one(
        &mut self,
        encoder_output: &Tensor,
        decoder_start: u32,
        eos_token_id: u32,
        params: &GenerationConfig,
    ) -> Result<Vec<u32>> {
        let mut output_ids = vec![decoder_start];
        let mut logits_processor = LogitsProcessor::from_sampling(params.seed, sampling(params));

        for step in 0.. {
            if output_ids.len() >= params.max_length {
                break;
            }

            let decoder_input = if step == 0 || !self.config.use_cache {
                Tensor::new(output_ids.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last = output_ids[output_ids.len() - 1];
                Tensor::new(&[last], &self.device)?.unsqueeze(0)?
            };

            let logits = self
                .model
                .decode(&decoder_input, encoder_output)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;

            let mut scores = logits.to_vec1::<f32>()?;
            if eos_token_id as usize >= scores.len() {
                return Err(EngineError::Generation {
                    message: format!(
                        "eos token id {} outside vocabulary of size {}",
                        eos_token_id,
                        scores.len()
                    ),
                });
            }
            suppress_eos(&mut scores, output_ids.len(), params.min_length, eos_token_id);
            for banned in banned_ngram_tokens(params.no_repeat_ngram_size, &output_ids) {
                scores[banned as usize] = f32::NEG_INFINITY;
            }

            let vocab = scores.len();
            let logits = Tensor::from_vec(scores, vocab, &self.device)?;
            let next_token = logits_processor.sample(&logits)?;
            output_ids.push(next_token);

            if next_token == eos_token_id {
                break;
            }
        }

        Ok(output_ids)
    }
}

/// Map the fixed generation parameters onto candle's sampling policy.
fn sampling(params: &GenerationConfig) -> Sampling {
    if !params.do_sample {
        return Sampling::ArgMax;
    }

    match params.top_k {
        Some(k) => Sampling::TopKThenTopP {
            k,
            p: params.top_p,
            temperature: params.temperature,
        },
        None => Sampling::TopP {
            p: params.top_p,
            temperature: params.temperature,
        },
    }
}

/// The leading unpadded slice of a fixed-width token row. An all-padding
/// row keeps a single pad token so the encoder always sees input.
fn trim_padding(row: &[u32], real_len: usize) -> &[u32] {
    let len = real_len.clamp(1, row.len());
    &row[..len]
}

/// Ban EOS while the output is shorter than the configured minimum, so
/// generation cannot stop before `min_length` tokens exist.
fn suppress_eos(scores: &mut [f32], generated: usize, min_length: usize, eos_token_id: u32) {
    if generated < min_length {
        scores[eos_token_id as usize] = f32::NEG_INFINITY;
    }
}

/// Tokens that would complete an n-gram already present in `tokens`.
///
/// Mirrors the usual no-repeat-ngram constraint: the last n-1 generated
/// tokens are matched against every n-gram seen so far, and each token that
/// followed such a prefix is banned for the next step.
fn banned_ngram_tokens(ngram_size: usize, tokens: &[u32]) -> Vec<u32> {
    if ngram_size == 0 || tokens.len() + 1 < ngram_size {
        return Vec::new();
    }

    let prefix = &tokens[tokens.len() + 1 - ngram_size..];
    let mut banned = Vec::new();
    for window in tokens.windows(ngram_size) {
        if &window[..ngram_size - 1] == prefix {
            banned.push(window[ngram_size - 1]);
        }
    }
    banned
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sampling_maps_to_top_k_then_top_p() {
        let params = GenerationConfig::default();
        match sampling(&params) {
            Sampling::TopKThenTopP { k, p, temperature } => {
                assert_eq!(k, 60);
                assert!((p - 0.95).abs() < f64::EPSILON);
                assert!((temperature - 1.0).abs() < f64::EPSILON);
            }
            _ => panic!("unexpected sampling policy"),
        }
    }

    #[test]
    fn test_greedy_when_sampling_disabled() {
        let params = GenerationConfig {
            do_sample: false,
            ..GenerationConfig::default()
        };
        assert!(matches!(sampling(&params), Sampling::ArgMax));
    }

    #[test]
    fn test_trim_padding_keeps_only_real_tokens() {
        let row = vec![5, 6, 7, 0, 0, 0];
        assert_eq!(trim_padding(&row, 3), &[5, 6, 7]);
    }

    #[test]
    fn test_trim_padding_of_full_row_is_identity() {
        let row = vec![1, 2, 3];
        assert_eq!(trim_padding(&row, 3), &[1, 2, 3]);
    }

    #[test]
    fn test_trim_padding_of_empty_sequence_keeps_one_pad() {
        let row = vec![0, 0, 0, 0];
        assert_eq!(trim_padding(&row, 0), &[0]);
    }

    #[test]
    fn test_eos_is_banned_below_min_length() {
        let min_length = GenerationConfig::default().min_length;
        let eos = 1u32;
        let mut scores = vec![0.5f32; 8];

        suppress_eos(&mut scores, min_length - 1, min_length, eos);
        assert_eq!(scores[eos as usize], f32::NEG_INFINITY);
        assert!(scores[0].is_finite());
    }

    #[test]
    fn test_eos_is_allowed_at_min_length() {
        let min_length = GenerationConfig::default().min_length;
        let eos = 1u32;
        let mut scores = vec![0.5f32; 8];

        suppress_eos(&mut scores, min_length, min_length, eos);
        assert_eq!(scores[eos as usize], 0.5);

        suppress_eos(&mut scores, min_length + 10, min_length, eos);
        assert_eq!(scores[eos as usize], 0.5);
    }

    #[test]
    fn test_completed_trigram_is_banned() {
        // 1 2 3 appeared already and 1 2 is the current tail, so 3 must
        // not be produced again.
        let tokens = vec![1, 2, 3, 4, 1, 2];
        assert_eq!(banned_ngram_tokens(3, &tokens), vec![3]);
    }

    #[test]
    fn test_multiple_continuations_are_banned() {
        let tokens = vec![1, 2, 3, 1, 2, 5, 1, 2];
        assert_eq!(banned_ngram_tokens(3, &tokens), vec![3, 5]);
    }

    #[test]
    fn test_no_ban_without_matching_prefix() {
        let tokens = vec![1, 2, 3, 4, 5];
        assert!(banned_ngram_tokens(3, &tokens).is_empty());
    }

    #[test]
    fn test_short_sequences_ban_nothing() {
        assert!(banned_ngram_tokens(3, &[1]).is_empty());
        assert!(banned_ngram_tokens(0, &[1, 2, 3, 1, 2]).is_empty());
    }
}
