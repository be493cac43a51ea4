// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic one-line pipeline summary.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use snapclaim_core::{ClickAdapter, HealthStatus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, warn};

use crate::metrics::{CounterSnapshot, LatencySummaries, MetricsSampler, PipelineCounters};
use crate::queue::WorkQueue;
use crate::registry::DedupRegistry;

/// Counters, gauges, and latency percentiles at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub counters: CounterSnapshot,
    pub queue_depth: usize,
    pub dedup_entries: usize,
    pub latency: LatencySummaries,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        write!(
            f,
            "seen={} allowed={} enqueued={} dropped={} clicked={} failed={} queue={} dedup={} \
             enqueue_ms p50/p95={} wait_ms p50/p95={} handler_ms p50/p95={}",
            c.seen,
            c.allowed,
            c.enqueued,
            c.dropped,
            c.clicked,
            c.failed,
            self.queue_depth,
            self.dedup_entries,
            self.latency.enqueue,
            self.latency.queue_wait,
            self.latency.handler,
        )
    }
}

/// Reads the shared pipeline state for reporting.
///
/// Every periodic line is followed by a health check of the click adapter;
/// anything but healthy is logged.
#[derive(Clone)]
pub struct StatsReporter {
    counters: Arc<PipelineCounters>,
    sampler: Arc<MetricsSampler>,
    queue: Arc<WorkQueue>,
    registry: Arc<DedupRegistry>,
    clicker: Arc<dyn ClickAdapter>,
}

impl StatsReporter {
    pub fn new(
        counters: Arc<PipelineCounters>,
        sampler: Arc<MetricsSampler>,
        queue: Arc<WorkQueue>,
        registry: Arc<DedupRegistry>,
        clicker: Arc<dyn ClickAdapter>,
    ) -> Self {
        Self {
            counters,
            sampler,
            queue,
            registry,
            clicker,
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            counters: self.counters.snapshot(),
            queue_depth: self.queue.depth(),
            dedup_entries: self.registry.len(),
            latency: self.sampler.summaries(),
        }
    }

    /// Queries the click adapter and logs a status other than healthy.
    pub async fn report_health(&self) -> Option<HealthStatus> {
        let adapter = self.clicker.name();
        match self.clicker.health_check().await {
            Ok(HealthStatus::Healthy) => Some(HealthStatus::Healthy),
            Ok(HealthStatus::Degraded(reason)) => {
                warn!(adapter, %reason, "click adapter degraded");
                Some(HealthStatus::Degraded(reason))
            }
            Ok(HealthStatus::Unhealthy(reason)) => {
                error!(adapter, %reason, "click adapter unhealthy");
                Some(HealthStatus::Unhealthy(reason))
            }
            Err(e) => {
                error!(adapter, error = %e, "click adapter health check failed");
                None
            }
        }
    }

    /// Logs a summary every `interval` until cancelled.
    pub fn spawn(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let task = async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first immediate tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stats = self.snapshot();
                        #[cfg(feature = "prometheus")]
                        {
                            snapclaim_prometheus::set_queue_depth(stats.queue_depth as f64);
                            snapclaim_prometheus::set_dedup_entries(stats.dedup_entries as f64);
                        }
                        info!("stats {stats}");
                        self.report_health().await;
                    }
                    _ = cancel.cancelled() => {
                        info!("stats reporter shutting down");
                        break;
                    }
                }
            }
        };
        tokio::spawn(task.in_current_span())
    }
}
