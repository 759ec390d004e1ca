//! `tsync sites` command implementation

use crate::commands::new_table;
use crate::context::AppContext;
use crate::error::Result;
use crate::progress::create_spinner;
use colored::Colorize;

/// List every visible site
pub async fn run(ctx: &AppContext) -> Result<()> {
    let spinner = create_spinner("Fetching sites...");
    let sites = ctx.client.list_sites().await;
    spinner.finish_and_clear();
    let sites = sites?;

    if sites.is_empty() {
        println!("No sites found.");
        return Ok(());
    }

    let selected = ctx.selected_site().map(|s| s.id);

    let mut table = new_table(&["", "Site", "ID"]);
    for site in &sites {
        let marker = if selected.as_deref() == Some(site.id.as_str()) { "*" } else { "" };
        table.add_row(vec![marker, site.label(), site.id.as_str()]);
    }

    println!("{}", table);
    println!();
    println!("Select one with {}", "tsync select site <ID>".cyan());

    Ok(())
}
