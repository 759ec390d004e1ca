//! Catalog of logical ticket fields

use serde::Serialize;
use tsync_common::types::FieldKey;

/// A ticket field that can be mapped to a list column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogicalField {
    pub key: FieldKey,
    pub label: &'static str,
    pub required: bool,
}

/// The fixed field catalog, in presentation order
pub const LOGICAL_FIELDS: [LogicalField; 6] = [
    LogicalField {
        key: FieldKey::TicketNumber,
        label: "Ticket Number",
        required: true,
    },
    LogicalField {
        key: FieldKey::Subject,
        label: "Subject",
        required: true,
    },
    LogicalField {
        key: FieldKey::Route,
        label: "Route",
        required: false,
    },
    LogicalField {
        key: FieldKey::Description,
        label: "Description",
        required: true,
    },
    LogicalField {
        key: FieldKey::User,
        label: "User",
        required: true,
    },
    LogicalField {
        key: FieldKey::Status,
        label: "Status",
        required: false,
    },
];

/// Catalog entry for `key`
pub fn field(key: FieldKey) -> &'static LogicalField {
    match key {
        FieldKey::TicketNumber => &LOGICAL_FIELDS[0],
        FieldKey::Subject => &LOGICAL_FIELDS[1],
        FieldKey::Route => &LOGICAL_FIELDS[2],
        FieldKey::Description => &LOGICAL_FIELDS[3],
        FieldKey::User => &LOGICAL_FIELDS[4],
        FieldKey::Status => &LOGICAL_FIELDS[5],
    }
}
