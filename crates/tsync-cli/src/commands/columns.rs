//! `tsync columns` command implementation

use crate::commands::new_table;
use crate::context::AppContext;
use crate::error::Result;
use crate::progress::create_spinner;
use tsync_engine::mapping::selectable_columns;

/// Show the columns of the selected list that can receive a field
pub async fn run(ctx: &AppContext) -> Result<()> {
    let destination = ctx.require_destination()?;

    let spinner = create_spinner("Fetching columns...");
    let columns = ctx
        .client
        .list_columns(&destination.site_id, &destination.list_id)
        .await;
    spinner.finish_and_clear();

    let columns = selectable_columns(&columns?);
    if columns.is_empty() {
        println!("No selectable columns in this list.");
        return Ok(());
    }

    let mut table = new_table(&["Column", "Internal Name", "Description"]);
    for column in &columns {
        table.add_row(vec![
            column.label(),
            column.name.as_str(),
            column.description.as_deref().unwrap_or(""),
        ]);
    }
    println!("{}", table);

    Ok(())
}
