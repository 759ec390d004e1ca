//! Common types used across the ticket sync workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TsyncError;

/// Prefix of the storage key under which a destination's field mapping is kept
pub const MAPPING_KEY_PREFIX: &str = "fieldMapping_";

/// Key of a logical ticket field
///
/// The set is closed: every place that turns a message into a field value
/// matches on this enum, so adding a field is a compile error until every
/// such place handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    TicketNumber,
    Subject,
    Route,
    Description,
    User,
    Status,
}

impl FieldKey {
    /// Every key, in catalog order
    pub const ALL: [FieldKey; 6] = [
        FieldKey::TicketNumber,
        FieldKey::Subject,
        FieldKey::Route,
        FieldKey::Description,
        FieldKey::User,
        FieldKey::Status,
    ];

    /// Storage and matching form of the key
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::TicketNumber => "ticketnumber",
            FieldKey::Subject => "subject",
            FieldKey::Route => "route",
            FieldKey::Description => "description",
            FieldKey::User => "user",
            FieldKey::Status => "status",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = TsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TsyncError::UnknownField(s.to_string()))
    }
}

/// A column of a destination list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationColumn {
    /// Internal name, unique within a list; this is what records are keyed by
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl DestinationColumn {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: Some(display_name.into()),
            hidden: false,
            read_only: false,
            description: None,
        }
    }

    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Display name, falling back to the internal name
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Snapshot of an inbox message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMessage {
    pub id: String,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    pub sender_address: Option<String>,
    pub received_at: DateTime<Utc>,
    pub is_read: bool,
}

impl SourceMessage {
    /// Unread message with only an id and a receive time
    pub fn new(id: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            subject: None,
            body_preview: None,
            sender_address: None,
            received_at,
            is_read: false,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
        self.body_preview = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_sender(mut self, address: impl Into<String>) -> Self {
        self.sender_address = Some(address.into());
        self
    }
}

/// A site that hosts lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub id: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

impl SiteSummary {
    pub fn label(&self) -> &str {
        preferred_label(&self.display_name, &self.name, &self.id)
    }
}

/// A list within a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub id: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

impl ListSummary {
    pub fn label(&self) -> &str {
        preferred_label(&self.display_name, &self.name, &self.id)
    }
}

fn preferred_label<'a>(display: &'a Option<String>, name: &'a Option<String>, id: &'a str) -> &'a str {
    display
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| name.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(id)
}

/// A remembered site or list choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub name: String,
}

impl Selection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The (site, list) pair that records are written to
///
/// Mappings are scoped to a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub site_id: String,
    pub list_id: String,
}

impl Destination {
    pub fn new(site_id: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            list_id: list_id.into(),
        }
    }

    /// Key under which this destination's mapping is stored
    pub fn mapping_key(&self) -> String {
        format!("{}{}_{}", MAPPING_KEY_PREFIX, self.site_id, self.list_id)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.site_id, self.list_id)
    }
}

impl FromStr for Destination {
    type Err = TsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((site, list)) if !site.is_empty() && !list.is_empty() && !list.contains('/') => {
                Ok(Destination::new(site, list))
            },
            _ => Err(TsyncError::InvalidDestination(s.to_string())),
        }
    }
}
