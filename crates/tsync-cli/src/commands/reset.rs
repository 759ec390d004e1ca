//! `tsync reset` command implementation

use crate::context::AppContext;
use crate::error::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use tsync_engine::store::MappingStore;

/// Clear every saved mapping and selection
pub async fn run(ctx: &AppContext, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This removes all saved field mappings and the selected site and list.".yellow()
        );
        print!("Continue? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;

        if !confirmed(&input) {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    ctx.store.clear_all();
    println!("{} Cleared saved state in {}", "✓".green(), ctx.store.path().display());

    Ok(())
}

fn confirmed(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
