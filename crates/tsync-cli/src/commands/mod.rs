//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod columns;
pub mod config;
pub mod lists;
pub mod mapping;
pub mod messages;
pub mod reset;
pub mod select;
pub mod sites;
pub mod sync;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// Table with the CLI's standard look
pub(crate) fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.to_vec());
    table
}
