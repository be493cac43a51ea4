// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background sweep of expired dedup entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::registry::DedupRegistry;

/// Evicts entries older than `ttl` every `interval` until cancelled.
///
/// This is the only task that evicts from the registry.
pub fn spawn_cleanup(
    registry: Arc<DedupRegistry>,
    ttl: Duration,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = registry.evict_expired(Instant::now(), ttl);
                    if evicted > 0 {
                        debug!(evicted, remaining = registry.len(), "dedup sweep");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("dedup cleanup shutting down");
                    break;
                }
            }
        }
    })
}
