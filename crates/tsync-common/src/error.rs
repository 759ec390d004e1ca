//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, TsyncError>;

/// Main error type for shared operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TsyncError {
    #[error("Unknown field '{0}'. Expected one of: ticketnumber, subject, route, description, user, status")]
    UnknownField(String),

    #[error("Invalid destination '{0}'. Expected '<site-id>/<list-id>'")]
    InvalidDestination(String),
}
