//! Error types for the tsync CLI
//!
//! Messages are user-facing and say what to do next where there is something
//! to do.

use thiserror::Error;
use tsync_common::TsyncError;
use tsync_engine::PreconditionError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Graph answered with an error status
    #[error("Graph API error ({status}): {message}")]
    Graph { status: u16, message: String },

    /// Nothing selected where a selection is needed
    #[error("No {0} selected. Run 'tsync select {0} <ID>' first.")]
    NoSelection(String),

    /// Column named in a mapping edit cannot be mapped
    #[error("Column '{0}' is not a selectable column of this list. Run 'tsync columns' to see the available columns.")]
    UnselectableColumn(String),

    /// A sync finished with failed messages
    #[error("{failed} message(s) failed to sync")]
    SyncFailed { failed: usize },

    /// A sync could not start
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Common(#[from] TsyncError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or config file.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and Graph URL.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML config file parsing failed
    #[error("Failed to parse config file: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl CliError {
    pub fn graph(status: u16, message: impl Into<String>) -> Self {
        Self::Graph {
            status,
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn no_selection(what: impl Into<String>) -> Self {
        Self::NoSelection(what.into())
    }

    /// Short detail for per-message reporting
    ///
    /// Graph errors report only the service's message.
    pub fn detail(&self) -> String {
        match self {
            Self::Graph { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_detail_is_service_message() {
        let err = CliError::graph(400, "Field 'Ticket' is read-only");
        assert_eq!(err.detail(), "Field 'Ticket' is read-only");
        assert_eq!(
            err.to_string(),
            "Graph API error (400): Field 'Ticket' is read-only"
        );
    }

    #[test]
    fn test_no_selection_message() {
        let err = CliError::no_selection("site");
        assert_eq!(
            err.to_string(),
            "No site selected. Run 'tsync select site <ID>' first."
        );
    }

    #[test]
    fn test_precondition_passthrough() {
        let err: CliError = PreconditionError::NoDestination.into();
        assert_eq!(err.to_string(), PreconditionError::NoDestination.to_string());
    }
}
