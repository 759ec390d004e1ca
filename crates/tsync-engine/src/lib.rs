//! Ticket Sync Engine
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Turns unread mailbox messages into rows of a remote list.
//!
//! # Overview
//!
//! - **Derivation** ([`derive`]): ticket numbers and route extraction
//! - **Fields** ([`fields`]): the fixed catalog of logical ticket fields
//! - **Mapping** ([`mapping`]): validation, auto-resolution and edits of the
//!   field → column mapping, plus loading through a [`store::MappingStore`]
//! - **Records** ([`record`]): building the column/value set for one message
//! - **Sync** ([`sync`]): the sequential write-then-acknowledge batch loop
//!
//! The engine performs no I/O of its own. Remote calls go through
//! [`sync::SyncTarget`] and persistence through [`store::MappingStore`].
//!
//! # Example
//!
//! ```no_run
//! use tsync_common::types::{Destination, SourceMessage};
//! use tsync_engine::mapping::FieldMapping;
//! use tsync_engine::sync::{SyncContext, SyncOrchestrator, SyncTarget};
//!
//! async fn run<T: SyncTarget>(
//!     target: &T,
//!     messages: &[SourceMessage],
//!     mapping: &FieldMapping,
//! ) {
//!     let destination = Destination::new("site", "list");
//!     let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
//!     let context = SyncContext::new(messages, Some(&destination), mapping);
//!
//!     match SyncOrchestrator::new().sync_batch(&ids, &context, target).await {
//!         Ok(report) => println!("{} synced", report.summary.success_count),
//!         Err(unmet) => eprintln!("not started: {unmet}"),
//!     }
//! }
//! ```

pub mod derive;
pub mod error;
pub mod fields;
pub mod mapping;
pub mod record;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use error::{AckError, PreconditionError, WriteError};
pub use fields::{LogicalField, LOGICAL_FIELDS};
pub use mapping::FieldMapping;
pub use record::{DestinationRecord, RecordBuilder};
pub use sync::{
    AckWarning, BatchReport, BatchSummary, SyncContext, SyncOrchestrator, SyncOutcome, SyncTarget,
};
