// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size pool of workers draining the work queue.
//!
//! Each worker loops dequeue -> record wait -> attempt -> record handler
//! time. A panic inside one attempt is caught at the loop boundary, counted
//! as a worker fault, and the worker moves on to the next task.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::executor::ClickExecutor;
use crate::metrics::{Counter, MetricsSampler, PipelineCounters, Window};
use crate::queue::{QueuedTask, WorkQueue};

/// Handles of the spawned workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current runtime.
    pub fn spawn(
        size: usize,
        queue: Arc<WorkQueue>,
        executor: ClickExecutor,
        sampler: Arc<MetricsSampler>,
        counters: Arc<PipelineCounters>,
        cancel: CancellationToken,
    ) -> Self {
        let handles = (0..size)
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    queue: Arc::clone(&queue),
                    executor: executor.clone(),
                    sampler: Arc::clone(&sampler),
                    counters: Arc::clone(&counters),
                };
                tokio::spawn(worker.run(cancel.clone()))
            })
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn into_handles(self) -> Vec<JoinHandle<()>> {
        self.handles
    }
}

struct Worker {
    id: usize,
    queue: Arc<WorkQueue>,
    executor: ClickExecutor,
    sampler: Arc<MetricsSampler>,
    counters: Arc<PipelineCounters>,
}

impl Worker {
    async fn run(self, cancel: CancellationToken) {
        debug!(worker_id = self.id, "worker started");
        loop {
            let task = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                task = self.queue.dequeue() => match task {
                    Some(task) => task,
                    None => break,
                },
            };
            self.process(task).await;
        }
        debug!(worker_id = self.id, "worker stopped");
    }

    async fn process(&self, task: QueuedTask) {
        let started = Instant::now();
        self.sampler
            .record(Window::QueueWait, started.duration_since(task.enqueued_at));

        let attempt = self
            .executor
            .attempt(&task.snapshot, task.received_wall, task.source);
        let outcome = AssertUnwindSafe(attempt).catch_unwind().await;

        self.sampler.record(Window::Handler, started.elapsed());

        if let Err(panic) = outcome {
            self.counters.increment(Counter::WorkerFault);
            error!(
                worker_id = self.id,
                message_id = %task.snapshot.id,
                source = %task.source,
                panic = panic_message(&*panic),
                "worker iteration panicked; continuing"
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
