//! Presentation boundary.
//!
//! The UI owns widgets and layout; this module only shapes normalized
//! recipe text into displayable blocks and exposes the copy action's sink.
//! No text content is transformed here.

use crate::types::RecipeText;

/// Split normalized recipe text on newline boundaries. Empty lines are
/// preserved as blank display lines, not dropped.
pub fn split_sections(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// One displayable recipe with an explicit 1-based index.
///
/// The index is carried on the block itself so action bindings never rely
/// on capturing a loop variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeBlock {
    /// 1-based position of the recipe in the result set.
    pub index: usize,
    /// Display title, e.g. `Recipe #1`.
    pub title: String,
    /// Recipe text split into display lines.
    pub lines: Vec<String>,
    /// The full normalized text, handed to the clipboard sink verbatim.
    pub full_text: String,
}

/// Build one numbered block per generated recipe, in result order.
pub fn build_blocks(recipes: &[RecipeText]) -> Vec<RecipeBlock> {
    recipes
        .iter()
        .enumerate()
        .map(|(i, recipe)| RecipeBlock {
            index: i + 1,
            title: format!("Recipe #{}", i + 1),
            lines: split_sections(&recipe.text),
            full_text: recipe.text.clone(),
        })
        .collect()
}

/// External clipboard-like sink for the per-recipe copy action.
pub trait ClipboardSink {
    /// Receive the full text of one recipe.
    fn copy(&mut self, text: &str);
}

/// Sink that writes the copied recipe to stdout, for terminal frontends.
#[derive(Debug, Default)]
pub struct StdoutClipboard;

impl ClipboardSink for StdoutClipboard {
    fn copy(&mut self, text: &str) {
        println!("Recipe copied to clipboard!");
        println!("{}", text);
    }
}
