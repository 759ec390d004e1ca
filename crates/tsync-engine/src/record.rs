//! Building list records from messages

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tsync_common::types::{FieldKey, SourceMessage};

use crate::derive::{extract_route, ticket_number_in, TicketZone};
use crate::mapping::FieldMapping;

/// Subject written when a message has none
pub const NO_SUBJECT: &str = "(No Subject)";

/// Sender written when a message has no address
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Status every new ticket starts in
pub const NEW_STATUS: &str = "New";

/// Column name → value set for one list item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationRecord {
    fields: BTreeMap<String, String>,
}

impl DestinationRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

/// Turns messages into records under a mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder {
    zone: TicketZone,
}

impl RecordBuilder {
    /// Builder whose ticket numbers use the local wall clock
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(zone: TicketZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> TicketZone {
        self.zone
    }

    /// Value of one logical field for `message`
    ///
    /// `None` means the column is left out of the record entirely; only the
    /// route can be absent.
    pub fn field_value(&self, key: FieldKey, message: &SourceMessage) -> Option<String> {
        match key {
            FieldKey::TicketNumber => Some(ticket_number_in(message.received_at, self.zone)),
            FieldKey::Subject => Some(
                message
                    .subject
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or(NO_SUBJECT)
                    .to_string(),
            ),
            FieldKey::Route => extract_route(message.body_preview.as_deref()),
            FieldKey::Description => Some(message.body_preview.clone().unwrap_or_default()),
            FieldKey::User => Some(
                message
                    .sender_address
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or(UNKNOWN_SENDER)
                    .to_string(),
            ),
            FieldKey::Status => Some(NEW_STATUS.to_string()),
        }
    }

    /// Record for `message`: one entry per mapped field with a value
    pub fn build_record(&self, message: &SourceMessage, mapping: &FieldMapping) -> DestinationRecord {
        let fields = mapping
            .iter()
            .filter_map(|(key, column)| {
                self.field_value(key, message)
                    .map(|value| (column.to_string(), value))
            })
            .collect();

        DestinationRecord { fields }
    }
}
