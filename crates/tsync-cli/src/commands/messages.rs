//! `tsync messages` command implementation

use crate::commands::new_table;
use crate::context::AppContext;
use crate::error::Result;
use crate::progress::create_spinner;
use chrono::Local;
use colored::Colorize;
use tsync_common::types::{FieldKey, SourceMessage};
use tsync_engine::RecordBuilder;

/// Shown when a message carries no route
const NO_ROUTE: &str = "—";

/// Show unread messages, oldest first, with the values they would produce
pub async fn run(ctx: &AppContext, limit: Option<u32>) -> Result<()> {
    let builder = ctx.record_builder()?;
    let limit = limit.unwrap_or(ctx.config.message_limit);

    let spinner = create_spinner("Fetching unread messages...");
    let messages = ctx.client.list_unread_messages(limit).await;
    spinner.finish_and_clear();
    let messages = messages?;

    if messages.is_empty() {
        println!("No unread messages.");
        return Ok(());
    }

    let mut table = new_table(&["ID", "Received", "Ticket", "From", "Subject", "Route"]);
    for message in &messages {
        table.add_row(message_row(&builder, message));
    }

    println!("{}", table);
    println!();
    println!(
        "{} unread message(s). Sync with {}",
        messages.len(),
        "tsync sync <ID>... | --all".cyan()
    );

    Ok(())
}

fn message_row(builder: &RecordBuilder, message: &SourceMessage) -> Vec<String> {
    let value = |key| builder.field_value(key, message).unwrap_or_default();

    vec![
        message.id.clone(),
        message
            .received_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        value(FieldKey::TicketNumber),
        value(FieldKey::User),
        value(FieldKey::Subject),
        builder
            .field_value(FieldKey::Route, message)
            .unwrap_or_else(|| NO_ROUTE.to_string()),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tsync_engine::derive::TicketZone;

    #[test]
    fn test_message_row_placeholders() {
        let builder = RecordBuilder::with_zone(TicketZone::utc());
        let message = SourceMessage::new("m1", Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 0).unwrap());

        let row = message_row(&builder, &message);
        assert_eq!(row[0], "m1");
        assert_eq!(row[2], "202405060708");
        assert_eq!(row[3], "Unknown");
        assert_eq!(row[4], "(No Subject)");
        assert_eq!(row[5], NO_ROUTE);
    }
}
