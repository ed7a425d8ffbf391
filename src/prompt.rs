//! Prompt formatting for the recipe model.
//!
//! The pretrained model was trained on inputs of the form
//! `items: <comma-separated ingredients>`; every raw input gets that prefix
//! verbatim, with no trimming or case normalization.

/// Instruction prefix the model expects on every input.
pub const PROMPT_PREFIX: &str = "items: ";

/// Prefix a single raw input.
pub fn format_prompt(input: &str) -> String {
    format!("{}{}", PROMPT_PREFIX, input)
}

/// Prefix every input in a batch, preserving count and order.
pub fn format_prompts(inputs: &[String]) -> Vec<String> {
    inputs.iter().map(|input| format_prompt(input)).collect()
}

/// Whether a raw input warrants a generation request at all. Blank input
/// is a silent no-op, not an error.
pub fn has_ingredients(input: &str) -> bool {
    !input.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefix_is_prepended_verbatim() {
        let formatted = format_prompt("tomato, basil, mozzarella");
        assert_eq!(formatted, "items: tomato, basil, mozzarella");
        assert!(formatted.starts_with(PROMPT_PREFIX));
    }

    #[test]
    fn test_no_trimming_or_case_change() {
        assert_eq!(format_prompt("  Eggs, FLOUR "), "items:   Eggs, FLOUR ");
    }

    #[test]
    fn test_batch_formatting_preserves_count_and_order() {
        let inputs = vec!["a".to_string(), "b".to_string()];
        let formatted = format_prompts(&inputs);
        assert_eq!(formatted, vec!["items: a", "items: b"]);
    }

    #[test]
    fn test_blank_input_is_rejected() {
        assert!(!has_ingredients(""));
        assert!(!has_ingredients("   \n"));
        assert!(has_ingredients("rice"));
    }
}
