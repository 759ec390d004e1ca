//! `tsync mapping` command implementation
//!
//! Works on the mapping of the selected destination. Edits start from the
//! active mapping (saved, or guessed when nothing is saved) and are saved
//! right away.

use crate::commands::new_table;
use crate::context::AppContext;
use crate::error::{CliError, Result};
use crate::progress::create_spinner;
use colored::Colorize;
use tsync_common::types::{Destination, DestinationColumn, FieldKey};
use tsync_engine::mapping::{apply_edit, auto_resolve, selectable_columns, MappingOrigin};
use tsync_engine::{FieldMapping, LOGICAL_FIELDS};

/// Show the active mapping and whether it is complete
pub async fn show(ctx: &AppContext) -> Result<()> {
    let destination = ctx.require_destination()?;
    let columns = fetch_columns(ctx, &destination).await?;
    let resolved = ctx.resolver().resolve(&destination, &columns);

    print_mapping(&resolved.mapping, &columns);

    match resolved.origin {
        MappingOrigin::Saved => println!("Saved mapping for {}", destination),
        MappingOrigin::AutoResolved => println!(
            "{} Guessed from column names and not saved yet. Save it with {}",
            "ℹ".cyan(),
            "tsync mapping auto --save".cyan()
        ),
    }

    if !resolved.pruned.is_empty() {
        println!(
            "{} Dropped fields whose column no longer exists: {}",
            "⚠".yellow(),
            join_keys(&resolved.pruned)
        );
    }

    print_validity(ctx, &resolved.mapping);
    Ok(())
}

/// Map `field` to `column` and save
pub async fn set(ctx: &AppContext, field: &str, column: &str) -> Result<()> {
    let key: FieldKey = field.parse()?;
    let destination = ctx.require_destination()?;
    let columns = fetch_columns(ctx, &destination).await?;

    let selectable = selectable_columns(&columns);
    let target = find_column(&selectable, column)
        .ok_or_else(|| CliError::UnselectableColumn(column.to_string()))?;

    let resolver = ctx.resolver();
    let current = resolver.resolve(&destination, &columns).mapping;
    let next = apply_edit(&current, key, Some(&target.name));
    resolver.save(&destination, &next);

    println!(
        "{} Mapped {} to {} ({})",
        "✓".green(),
        key.to_string().bold(),
        target.label(),
        target.name
    );
    print_validity(ctx, &next);
    Ok(())
}

/// Clear `field` and save
pub async fn unset(ctx: &AppContext, field: &str) -> Result<()> {
    let key: FieldKey = field.parse()?;
    let destination = ctx.require_destination()?;
    let columns = fetch_columns(ctx, &destination).await?;

    let resolver = ctx.resolver();
    let current = resolver.resolve(&destination, &columns).mapping;
    let next = apply_edit(&current, key, None);
    resolver.save(&destination, &next);

    println!("{} Cleared {}", "✓".green(), key.to_string().bold());
    print_validity(ctx, &next);
    Ok(())
}

/// Show the mapping guessed from column names, optionally saving it
pub async fn auto(ctx: &AppContext, save: bool) -> Result<()> {
    let destination = ctx.require_destination()?;
    let columns = fetch_columns(ctx, &destination).await?;

    let guessed = auto_resolve(&selectable_columns(&columns), &LOGICAL_FIELDS);
    print_mapping(&guessed, &columns);

    if save {
        ctx.resolver().save(&destination, &guessed);
        println!("{} Saved mapping for {}", "✓".green(), destination);
    }

    print_validity(ctx, &guessed);
    Ok(())
}

/// Delete the saved mapping so the next use guesses again
pub async fn delete(ctx: &AppContext) -> Result<()> {
    let destination = ctx.require_destination()?;
    ctx.resolver().forget(&destination);
    println!("{} Deleted saved mapping for {}", "✓".green(), destination);
    Ok(())
}

async fn fetch_columns(ctx: &AppContext, destination: &Destination) -> Result<Vec<DestinationColumn>> {
    let spinner = create_spinner("Fetching columns...");
    let columns = ctx
        .client
        .list_columns(&destination.site_id, &destination.list_id)
        .await;
    spinner.finish_and_clear();
    columns
}

/// Column named `wanted` by internal name, then by display name
fn find_column<'a>(columns: &'a [DestinationColumn], wanted: &str) -> Option<&'a DestinationColumn> {
    let wanted = wanted.trim();
    columns
        .iter()
        .find(|c| c.name == wanted)
        .or_else(|| columns.iter().find(|c| c.name.eq_ignore_ascii_case(wanted)))
        .or_else(|| {
            columns.iter().find(|c| {
                c.display_name
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(wanted))
            })
        })
}

fn print_mapping(mapping: &FieldMapping, columns: &[DestinationColumn]) {
    let mut table = new_table(&["Field", "Key", "Required", "Column"]);

    for field in &LOGICAL_FIELDS {
        let column = match mapping.get(field.key) {
            Some(name) => match columns.iter().find(|c| c.name == name) {
                Some(c) if c.label() != c.name => format!("{} ({})", c.label(), c.name),
                _ => name.to_string(),
            },
            None => "—".to_string(),
        };

        table.add_row(vec![
            field.label.to_string(),
            field.key.to_string(),
            (if field.required { "yes" } else { "" }).to_string(),
            column,
        ]);
    }

    println!("{}", table);
}

fn print_validity(ctx: &AppContext, mapping: &FieldMapping) {
    let missing = ctx.resolver().missing_required(mapping);
    if missing.is_empty() {
        println!("{} Mapping is complete", "✓".green());
    } else {
        println!(
            "{} Required fields not mapped: {}",
            "✗".red(),
            join_keys(&missing)
        );
    }
}

fn join_keys(keys: &[FieldKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_column_prefers_internal_name() {
        let columns = vec![
            DestinationColumn::new("Title", "Subject"),
            DestinationColumn::new("Subject", "Legacy Subject"),
            DestinationColumn::new("Ticket_x0020_Number", "Ticket Number"),
        ];

        assert_eq!(find_column(&columns, "Subject").map(|c| c.name.as_str()), Some("Subject"));
        assert_eq!(find_column(&columns, "title").map(|c| c.name.as_str()), Some("Title"));
        assert_eq!(
            find_column(&columns, "ticket number").map(|c| c.name.as_str()),
            Some("Ticket_x0020_Number")
        );
        assert!(find_column(&columns, "Missing").is_none());
    }
}
