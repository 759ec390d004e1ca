//! Ticket Sync Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the ticket sync workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all workspace members:
//!
//! - **Error Handling**: The shared error type and result alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Types**: Mailbox messages, list columns, sites, lists and destinations
//!
//! # Example
//!
//! ```no_run
//! use tsync_common::types::{Destination, SourceMessage};
//!
//! fn describe(destination: &Destination, message: &SourceMessage) -> String {
//!     format!("{} -> {}", message.id, destination)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TsyncError};
