//! `tsync select` command implementation
//!
//! Remembers the site and list that records are written to. Lists belong to
//! a site, so choosing a different site forgets the selected list.

use crate::context::AppContext;
use crate::error::{CliError, Result};
use colored::Colorize;
use tracing::info;
use tsync_common::types::Selection;
use tsync_engine::store::{MappingStore, SelectionKind};

/// Remember `site_id` as the selected site
pub async fn site(ctx: &AppContext, site_id: &str) -> Result<()> {
    let site = ctx.client.get_site(site_id).await?;
    let selection = Selection::new(site.id.clone(), site.label());

    let previous = ctx.store.load_last_selection(SelectionKind::Site);
    let changed = previous.as_ref().map(|p| p.id.as_str()) != Some(selection.id.as_str());

    ctx.store.save_last_selection(SelectionKind::Site, &selection);
    if changed {
        ctx.store.forget_last_selection(SelectionKind::List);
    }
    info!(site_id = %selection.id, "Site selected");

    println!("{} Selected site {} ({})", "✓".green(), selection.name.bold(), selection.id);
    if changed {
        println!("Now select a list with {}", "tsync lists".cyan());
    }

    Ok(())
}

/// Remember `list_id` as the selected list of the selected site
pub async fn list(ctx: &AppContext, list_id: &str) -> Result<()> {
    let site = ctx
        .selected_site()
        .ok_or_else(|| CliError::no_selection("site"))?;

    let list = ctx.client.get_list(&site.id, list_id).await?;
    let selection = Selection::new(list.id.clone(), list.label());

    ctx.store.save_last_selection(SelectionKind::List, &selection);
    info!(site_id = %site.id, list_id = %selection.id, "List selected");

    println!(
        "{} Selected list {} in {}",
        "✓".green(),
        selection.name.bold(),
        site.name
    );
    println!("Check the field mapping with {}", "tsync mapping show".cyan());

    Ok(())
}

/// Print the current selection
pub async fn show(ctx: &AppContext) -> Result<()> {
    let describe = |selection: Option<Selection>| match selection {
        Some(s) => format!("{} ({})", s.name, s.id),
        None => "(none)".dimmed().to_string(),
    };

    println!("{:<6} {}", "Site:", describe(ctx.selected_site()));
    println!("{:<6} {}", "List:", describe(ctx.selected_list()));

    Ok(())
}
