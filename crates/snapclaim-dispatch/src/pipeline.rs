// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of the dispatch pipeline.
//!
//! [`Pipeline::start`] builds the shared state from [`PipelineSettings`],
//! spawns the worker pool and the two background tasks (dedup cleanup and
//! stats), and hands out an [`IngestionHandler`] for the event source.

use std::sync::Arc;
use std::time::Duration;

use snapclaim_core::ClickAdapter;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cleanup::spawn_cleanup;
use crate::executor::ClickExecutor;
use crate::filter::AdmissionFilter;
use crate::ingest::{IngestionHandler, SourcePolicy};
use crate::metrics::{MetricsSampler, PipelineCounters};
use crate::queue::WorkQueue;
use crate::registry::DedupRegistry;
use crate::settings::PipelineSettings;
use crate::shutdown::join_with_grace;
use crate::stats::StatsReporter;
use crate::worker::WorkerPool;

/// A running pipeline.
pub struct Pipeline {
    settings: Arc<PipelineSettings>,
    ingest: IngestionHandler,
    stats: StatsReporter,
    registry: Arc<DedupRegistry>,
    queue: Arc<WorkQueue>,
    clicker: Arc<dyn ClickAdapter>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Spawns workers, cleanup, and stats on the current runtime.
    ///
    /// Every task stops when `cancel` fires.
    pub fn start(
        settings: PipelineSettings,
        clicker: Arc<dyn ClickAdapter>,
        cancel: CancellationToken,
    ) -> Self {
        let settings = Arc::new(settings);
        let registry = Arc::new(DedupRegistry::new());
        let queue = Arc::new(WorkQueue::new(settings.queue_capacity));
        let sampler = Arc::new(MetricsSampler::new(settings.metrics_window));
        let counters = Arc::new(PipelineCounters::new());

        let executor = ClickExecutor::new(
            Arc::new(settings.accepted_labels.clone()),
            Arc::clone(&registry),
            Arc::clone(&clicker),
            Arc::clone(&counters),
        );

        let ingest = IngestionHandler::new(
            SourcePolicy {
                on_message: settings.on_message,
                on_edit: settings.on_edit,
            },
            Arc::new(AdmissionFilter::from_settings(&settings)),
            Arc::clone(&registry),
            Arc::clone(&queue),
            Arc::clone(&sampler),
            Arc::clone(&counters),
        );

        let stats = StatsReporter::new(
            Arc::clone(&counters),
            Arc::clone(&sampler),
            Arc::clone(&queue),
            Arc::clone(&registry),
            Arc::clone(&clicker),
        );

        let mut tasks = WorkerPool::spawn(
            settings.workers,
            Arc::clone(&queue),
            executor,
            sampler,
            counters,
            cancel.clone(),
        )
        .into_handles();
        tasks.push(spawn_cleanup(
            Arc::clone(&registry),
            settings.dedup_ttl,
            settings.cleanup_interval(),
            cancel.clone(),
        ));
        tasks.push(stats.clone().spawn(settings.stats_interval, cancel.clone()));

        info!(
            workers = settings.workers,
            queue_capacity = queue.capacity(),
            dedup_ttl_secs = settings.dedup_ttl.as_secs(),
            labels = ?settings.display_labels,
            on_message = settings.on_message,
            on_edit = settings.on_edit,
            clicker = clicker.name(),
            "dispatch pipeline started"
        );

        Self {
            settings,
            ingest,
            stats,
            registry,
            queue,
            clicker,
            cancel,
            tasks,
        }
    }

    /// Handle for the event source. Cheap to clone.
    pub fn ingest(&self) -> IngestionHandler {
        self.ingest.clone()
    }

    pub fn stats(&self) -> &StatsReporter {
        &self.stats
    }

    pub fn registry(&self) -> &Arc<DedupRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Cancels every task and waits up to `grace` for them to stop, then
    /// shuts the click adapter down.
    ///
    /// Tasks still queued are discarded.
    pub async fn shutdown(self, grace: Duration) {
        self.cancel.cancel();
        self.queue.close().await;
        let discarded = self.queue.depth();
        join_with_grace(self.tasks, grace).await;
        if let Err(e) = self.clicker.shutdown().await {
            warn!(adapter = self.clicker.name(), error = %e, "click adapter shutdown failed");
        }
        info!(
            discarded,
            final_stats = %self.stats.snapshot(),
            "dispatch pipeline stopped"
        );
    }
}
