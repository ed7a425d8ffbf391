//! Terminal frontend for the recipe engine.
//!
//! Reads one comma-separated ingredient list per line from stdin and
//! prints the generated recipe as a numbered, sectioned block.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use recipe_engine::render::{build_blocks, ClipboardSink, StdoutClipboard};
use recipe_engine::utils::{setup_logging, LogConfig};
use recipe_engine::{prompt, RecipeEngine};

const DEFAULT_HUB_REPO: &str = "flax-community/t5-recipe-generation";

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging(LogConfig::default()).map_err(anyhow::Error::msg)?;

    let args: Vec<String> = std::env::args().collect();
    let builder = match args.get(1) {
        Some(dir) => RecipeEngine::builder().with_model_dir(dir),
        None => RecipeEngine::builder().with_hub_repo(DEFAULT_HUB_REPO),
    };

    println!("Loading model...");
    let engine = builder.build().await?;

    let stdin = io::stdin();
    let mut clipboard = StdoutClipboard;
    loop {
        print!("Enter ingredients (comma-separated): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let ingredients = line.trim_end_matches('\n');

        // Blank input is a silent no-op; the engine is never invoked.
        if !prompt::has_ingredients(ingredients) {
            continue;
        }

        println!("Generating recipe... Please wait.");
        let recipes = engine.generate(ingredients).await?;

        for block in build_blocks(&recipes) {
            println!("{}", block.title);
            for line in &block.lines {
                println!("{}", line);
            }
            clipboard.copy(&block.full_text);
            println!("---");
        }
    }

    Ok(())
}
