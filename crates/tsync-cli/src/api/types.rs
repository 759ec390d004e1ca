//! Graph request and response types
//!
//! Wire shapes of the Graph resources the CLI touches, converted into the
//! workspace types at the client boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tsync_common::types::{DestinationColumn, ListSummary, SiteSummary, SourceMessage};
use tsync_engine::DestinationRecord;

/// Collection envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ODataErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSite {
    pub id: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

impl From<GraphSite> for SiteSummary {
    fn from(site: GraphSite) -> Self {
        SiteSummary {
            id: site.id,
            display_name: site.display_name,
            name: site.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphList {
    pub id: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

impl From<GraphList> for ListSummary {
    fn from(list: GraphList) -> Self {
        ListSummary {
            id: list.id,
            display_name: list.display_name,
            name: list.name,
        }
    }
}

/// Column definition of a list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphColumn {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
    pub description: Option<String>,
}

impl From<GraphColumn> for DestinationColumn {
    fn from(column: GraphColumn) -> Self {
        DestinationColumn {
            name: column.name,
            display_name: column.display_name,
            hidden: column.hidden,
            read_only: column.read_only,
            description: column.description.filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEmailAddress {
    pub address: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRecipient {
    pub email_address: Option<GraphEmailAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMessage {
    pub id: String,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    pub from: Option<GraphRecipient>,
    pub received_date_time: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl From<GraphMessage> for SourceMessage {
    fn from(message: GraphMessage) -> Self {
        let sender_address = message
            .from
            .and_then(|from| from.email_address)
            .and_then(|email| email.address);

        SourceMessage {
            id: message.id,
            subject: message.subject,
            body_preview: message.body_preview,
            sender_address,
            received_at: message.received_date_time,
            is_read: message.is_read,
        }
    }
}

/// Body of an item create call
#[derive(Debug, Serialize)]
pub struct CreateItemRequest<'a> {
    pub fields: &'a DestinationRecord,
}

/// Body of the mark-as-read call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReadPatch {
    pub is_read: bool,
}
