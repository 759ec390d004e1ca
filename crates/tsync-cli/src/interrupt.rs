//! Ctrl-C handling for long-running commands
//!
//! The first interrupt cancels the sync between messages; a second one quits
//! right away, even while a write is still waiting on Graph.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Exit status used when quitting on a second interrupt
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cancel `token` on the first signal and call `force_quit` on the second
///
/// `next_signal` resolves to `false` when no further signals can be received.
pub async fn watch_interrupts<S, Fut, Q>(token: CancellationToken, mut next_signal: S, force_quit: Q)
where
    S: FnMut() -> Fut,
    Fut: Future<Output = bool>,
    Q: FnOnce(),
{
    if !next_signal().await {
        return;
    }
    warn!("Interrupted; stopping after the current message. Press Ctrl-C again to quit now");
    token.cancel();

    if next_signal().await {
        warn!("Interrupted again; quitting");
        force_quit();
    }
}

/// Token cancelled on the first Ctrl-C; the process exits on the second
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();

    tokio::spawn(watch_interrupts(
        token.clone(),
        || async { tokio::signal::ctrl_c().await.is_ok() },
        || std::process::exit(INTERRUPTED_EXIT_CODE),
    ));

    token
}
