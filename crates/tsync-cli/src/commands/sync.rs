//! `tsync sync` command implementation
//!
//! Fetches unread messages and the active mapping, then hands the selected
//! messages to the engine. Session and destination problems are left for the
//! engine to report so they surface in a fixed order.

use crate::context::AppContext;
use crate::error::{CliError, Result};
use crate::progress::create_sync_progress;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tsync_common::types::{Destination, SourceMessage};
use tsync_engine::mapping::FieldMapping;
use tsync_engine::sync::SyncContext;
use tsync_engine::{BatchReport, SyncOrchestrator, SyncTarget};

/// What to sync
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    /// Message ids in the order to sync them
    pub ids: Vec<String>,
    /// Sync every fetched unread message
    pub all: bool,
    pub limit: Option<u32>,
    /// Destination overriding the selected one, as `<site-id>/<list-id>`
    pub to: Option<String>,
}

/// Run a sync; fails with [`CliError::SyncFailed`] when any message failed
pub async fn run(ctx: &AppContext, request: SyncRequest, cancel: CancellationToken) -> Result<BatchReport> {
    let destination = match &request.to {
        Some(raw) => Some(raw.parse::<Destination>()?),
        None => ctx.destination(),
    };

    let messages = if ctx.client.has_mail_session() {
        let limit = request.limit.unwrap_or(ctx.config.message_limit);
        ctx.client.list_unread_messages(limit).await?
    } else {
        Vec::new()
    };

    let mapping = match &destination {
        Some(dest) if ctx.client.has_mail_session() && ctx.client.has_list_session() => {
            let columns = ctx.client.list_columns(&dest.site_id, &dest.list_id).await?;
            ctx.resolver().resolve(dest, &columns).mapping
        },
        _ => FieldMapping::new(),
    };

    let ids = if request.all {
        if messages.is_empty() && ctx.client.has_mail_session() {
            println!("No unread messages.");
            return Ok(BatchReport::default());
        }
        messages.iter().map(|m| m.id.clone()).collect()
    } else {
        request.ids
    };

    let report = execute(ctx, &ids, &messages, destination.as_ref(), &mapping, cancel).await?;
    print_report(&report, &messages);

    if report.has_failures() {
        return Err(CliError::SyncFailed {
            failed: report.summary.failure_count,
        });
    }
    Ok(report)
}

async fn execute(
    ctx: &AppContext,
    ids: &[String],
    messages: &[SourceMessage],
    destination: Option<&Destination>,
    mapping: &FieldMapping,
    cancel: CancellationToken,
) -> Result<BatchReport> {
    let orchestrator = SyncOrchestrator::new()
        .with_builder(ctx.record_builder()?)
        .with_cancellation(cancel);

    let context = SyncContext::new(messages, destination, mapping);
    orchestrator.check_preconditions(ids, &context, &ctx.client)?;

    info!(count = ids.len(), "Starting sync");
    let progress = create_sync_progress(ids.len() as u64);

    let report = orchestrator
        .sync_batch_observed(ids, &context, &ctx.client, |outcome| {
            progress.set_message(outcome.message_id.clone());
            progress.inc(1);
        })
        .await;

    progress.finish_and_clear();
    Ok(report?)
}

fn print_report(report: &BatchReport, messages: &[SourceMessage]) {
    let subject_of = |id: &str| {
        messages
            .iter()
            .find(|m| m.id == id)
            .and_then(|m| m.subject.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(tsync_engine::record::NO_SUBJECT)
            .to_string()
    };

    for outcome in &report.outcomes {
        if outcome.succeeded {
            println!("{} {} {}", "✓".green(), outcome.message_id, subject_of(&outcome.message_id).dimmed());
        } else {
            println!(
                "{} {} {}: {}",
                "✗".red(),
                outcome.message_id,
                subject_of(&outcome.message_id).dimmed(),
                outcome.error_detail.as_deref().unwrap_or("unknown error")
            );
        }
    }

    for warning in &report.warnings {
        println!(
            "{} {} was synced but could not be marked as read: {}",
            "⚠".yellow(),
            warning.message_id,
            warning.detail
        );
    }

    for id in &report.skipped {
        println!("{} {} is not an unread message; skipped", "⚠".yellow(), id);
    }

    if report.cancelled {
        println!(
            "{} Cancelled; {} message(s) not attempted",
            "ℹ".cyan(),
            report.not_attempted.len()
        );
    }

    println!();
    println!(
        "Synced {} message(s), {} failed",
        report.summary.success_count.to_string().green(),
        if report.summary.failure_count > 0 {
            report.summary.failure_count.to_string().red()
        } else {
            report.summary.failure_count.to_string().normal()
        }
    );
}
