//! Error types for the sync engine
//!
//! Only [`PreconditionError`] ever leaves a batch call. Write and acknowledge
//! failures are scoped to a single message and end up in the batch report.

use thiserror::Error;
use tsync_common::types::FieldKey;

/// A condition that must hold before a batch is started
///
/// Returned before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("No mail session. Configure a mail access token before syncing.")]
    MissingMailSession,

    #[error("No list session. Configure a list access token before syncing.")]
    MissingListSession,

    #[error("No messages selected.")]
    EmptySelection,

    #[error("No destination selected. Select a site and a list first.")]
    NoDestination,

    #[error("Field mapping is incomplete; required fields not mapped: {}", join_keys(.missing))]
    InvalidMapping { missing: Vec<FieldKey> },
}

fn join_keys(keys: &[FieldKey]) -> String {
    keys.iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The destination rejected a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct WriteError {
    pub detail: String,
}

impl WriteError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Marking a source message as consumed failed after its record was written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct AckError {
    pub detail: String,
}

impl AckError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
