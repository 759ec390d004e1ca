//! Batch synchronization of messages into a list
//!
//! A batch is processed strictly in order, one message at a time: build the
//! record, write it, and only after a successful write acknowledge the source
//! message. Each message succeeds or fails on its own; nothing a single
//! message does can abort the batch.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use tsync_common::types::{Destination, SourceMessage};

use crate::error::{AckError, PreconditionError, WriteError};
use crate::fields::{LogicalField, LOGICAL_FIELDS};
use crate::mapping::{missing_required, FieldMapping};
use crate::record::{DestinationRecord, RecordBuilder};

/// Remote side of a sync: where records go and where messages are marked read
#[async_trait]
pub trait SyncTarget: Send + Sync {
    /// Whether a mail session (for acknowledging) is available
    fn has_mail_session(&self) -> bool;

    /// Whether a list session (for writing records) is available
    fn has_list_session(&self) -> bool;

    /// Create one list item
    async fn write_record(
        &self,
        destination: &Destination,
        record: &DestinationRecord,
    ) -> Result<(), WriteError>;

    /// Mark a source message as consumed
    async fn acknowledge(&self, message_id: &str) -> Result<(), AckError>;
}

/// Inputs of one batch, borrowed for its whole duration
pub struct SyncContext<'a> {
    messages: HashMap<&'a str, &'a SourceMessage>,
    destination: Option<&'a Destination>,
    mapping: &'a FieldMapping,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        messages: &'a [SourceMessage],
        destination: Option<&'a Destination>,
        mapping: &'a FieldMapping,
    ) -> Self {
        Self {
            messages: messages.iter().map(|m| (m.id.as_str(), m)).collect(),
            destination,
            mapping,
        }
    }

    fn message(&self, id: &str) -> Option<&'a SourceMessage> {
        self.messages.get(id).copied()
    }
}

/// Result of syncing one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub message_id: String,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

/// An acknowledge that failed after the record was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AckWarning {
    pub message_id: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
}

/// Everything a batch produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    /// One entry per attempted message, in input order
    pub outcomes: Vec<SyncOutcome>,
    pub warnings: Vec<AckWarning>,
    /// Selected ids missing from the message snapshot
    pub skipped: Vec<String>,
    /// Set when the batch stopped early on cancellation
    pub cancelled: bool,
    /// Ids never started because of cancellation
    pub not_attempted: Vec<String>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.summary.failure_count > 0
    }

    fn record(&mut self, outcome: SyncOutcome) {
        if outcome.succeeded {
            self.summary.success_count += 1;
        } else {
            self.summary.failure_count += 1;
        }
        self.outcomes.push(outcome);
    }
}

/// Drives a batch through a [`SyncTarget`]
#[derive(Debug, Clone)]
pub struct SyncOrchestrator {
    builder: RecordBuilder,
    fields: &'static [LogicalField],
    cancellation: Option<CancellationToken>,
}

impl Default for SyncOrchestrator {
    fn default() -> Self {
        Self {
            builder: RecordBuilder::new(),
            fields: &LOGICAL_FIELDS,
            cancellation: None,
        }
    }
}

impl SyncOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_builder(mut self, builder: RecordBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Stop before the next message once `token` is cancelled
    ///
    /// A write already in flight is always awaited.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Check every precondition without touching the target's remote side
    pub fn check_preconditions<T: SyncTarget + ?Sized>(
        &self,
        message_ids: &[String],
        context: &SyncContext<'_>,
        target: &T,
    ) -> Result<(), PreconditionError> {
        if !target.has_mail_session() {
            return Err(PreconditionError::MissingMailSession);
        }
        if !target.has_list_session() {
            return Err(PreconditionError::MissingListSession);
        }
        if message_ids.is_empty() {
            return Err(PreconditionError::EmptySelection);
        }
        if context.destination.is_none() {
            return Err(PreconditionError::NoDestination);
        }

        let missing = missing_required(context.mapping, self.fields);
        if !missing.is_empty() {
            return Err(PreconditionError::InvalidMapping { missing });
        }

        Ok(())
    }

    /// Sync `message_ids` in order
    pub async fn sync_batch<T: SyncTarget + ?Sized>(
        &self,
        message_ids: &[String],
        context: &SyncContext<'_>,
        target: &T,
    ) -> Result<BatchReport, PreconditionError> {
        self.sync_batch_observed(message_ids, context, target, |_| {})
            .await
    }

    /// Like [`sync_batch`](Self::sync_batch), calling `on_outcome` after each
    /// attempted message
    #[instrument(name = "sync_batch", skip_all, fields(messages = message_ids.len()))]
    pub async fn sync_batch_observed<T, F>(
        &self,
        message_ids: &[String],
        context: &SyncContext<'_>,
        target: &T,
        mut on_outcome: F,
    ) -> Result<BatchReport, PreconditionError>
    where
        T: SyncTarget + ?Sized,
        F: FnMut(&SyncOutcome),
    {
        self.check_preconditions(message_ids, context, target)?;

        let Some(destination) = context.destination else {
            return Err(PreconditionError::NoDestination);
        };

        let mut report = BatchReport::default();

        for (index, id) in message_ids.iter().enumerate() {
            if self.is_cancelled() {
                info!(remaining = message_ids.len() - index, "Sync cancelled");
                report.cancelled = true;
                report.not_attempted = message_ids[index..].to_vec();
                break;
            }

            let Some(message) = context.message(id) else {
                debug!(message_id = %id, "Selected message not in snapshot; skipping");
                report.skipped.push(id.clone());
                continue;
            };

            let record = self.builder.build_record(message, context.mapping);

            let outcome = match target.write_record(destination, &record).await {
                Ok(()) => {
                    debug!(message_id = %id, columns = record.len(), "Record written");

                    if let Err(err) = target.acknowledge(id).await {
                        warn!(message_id = %id, error = %err, "Record written but acknowledge failed");
                        report.warnings.push(AckWarning {
                            message_id: id.clone(),
                            detail: err.detail,
                        });
                    }

                    SyncOutcome {
                        message_id: id.clone(),
                        succeeded: true,
                        error_detail: None,
                    }
                },
                Err(err) => {
                    warn!(message_id = %id, error = %err, "Record write failed");
                    SyncOutcome {
                        message_id: id.clone(),
                        succeeded: false,
                        error_detail: Some(err.detail),
                    }
                },
            };

            on_outcome(&outcome);
            report.record(outcome);
        }

        info!(
            succeeded = report.summary.success_count,
            failed = report.summary.failure_count,
            skipped = report.skipped.len(),
            ack_warnings = report.warnings.len(),
            "Sync batch finished"
        );

        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
