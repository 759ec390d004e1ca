//! `tsync lists` command implementation

use crate::commands::new_table;
use crate::context::AppContext;
use crate::error::{CliError, Result};
use crate::progress::create_spinner;
use colored::Colorize;

/// List the lists of `site`, or of the selected site
pub async fn run(ctx: &AppContext, site: Option<String>) -> Result<()> {
    let site_id = match site {
        Some(id) => id,
        None => {
            ctx.selected_site()
                .ok_or_else(|| CliError::no_selection("site"))?
                .id
        },
    };

    let spinner = create_spinner("Fetching lists...");
    let lists = ctx.client.list_lists(&site_id).await;
    spinner.finish_and_clear();
    let lists = lists?;

    if lists.is_empty() {
        println!("No lists found in site {}.", site_id);
        return Ok(());
    }

    let selected = ctx.selected_list().map(|l| l.id);

    let mut table = new_table(&["", "List", "ID"]);
    for list in &lists {
        let marker = if selected.as_deref() == Some(list.id.as_str()) { "*" } else { "" };
        table.add_row(vec![marker, list.label(), list.id.as_str()]);
    }

    println!("{}", table);
    println!();
    println!("Select one with {}", "tsync select list <ID>".cyan());

    Ok(())
}
