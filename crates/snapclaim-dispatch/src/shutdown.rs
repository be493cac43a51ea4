// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that every background task monitors. Tasks get a
//! short grace period to finish their current unit of work; stragglers are
//! aborted. Queued tasks are never drained.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
/// The signal handler task runs in the background until the token is cancelled.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                        _ = token_clone.cancelled() => {
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = token_clone.cancelled() => {
                            return;
                        }
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = ctrl_c => {
                    info!("received Ctrl+C, initiating shutdown");
                }
                _ = token_clone.cancelled() => {
                    return;
                }
            }
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `grace` for `handles` to finish, then aborts the rest.
///
/// Task outputs are discarded. Returns the number of tasks that had to be
/// aborted.
pub async fn join_with_grace<T>(handles: Vec<JoinHandle<T>>, grace: Duration) -> usize {
    if handles.is_empty() {
        return 0;
    }

    let deadline = tokio::time::Instant::now() + grace;
    let mut aborted = 0;

    for mut handle in handles {
        match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.is_panic() => warn!(error = %e, "background task panicked"),
            Ok(Err(_)) => {}
            Err(_) => {
                handle.abort();
                aborted += 1;
            }
        }
    }

    if aborted == 0 {
        info!("all background tasks stopped");
    } else {
        warn!(aborted, "grace period elapsed, aborted remaining tasks");
    }
    aborted
}
