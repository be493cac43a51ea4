// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rolling latency windows and pipeline counters.
//!
//! [`MetricsSampler`] keeps three fixed-capacity ring buffers of millisecond
//! samples (enqueue latency, queue wait, handler time), each behind its own
//! mutex so workers recording different windows never contend. Percentiles
//! are computed on demand from a sorted copy. [`PipelineCounters`] holds the
//! monotonically increasing event counts as atomics.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Which latency window a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// Event receipt to successful enqueue.
    Enqueue,
    /// Enqueue to dequeue by a worker.
    QueueWait,
    /// Click executor run time.
    Handler,
}

impl Window {
    pub fn as_str(self) -> &'static str {
        match self {
            Window::Enqueue => "enqueue",
            Window::QueueWait => "wait",
            Window::Handler => "handler",
        }
    }
}

/// A fixed-capacity ring buffer of millisecond samples.
///
/// The oldest sample is evicted when a new one arrives at capacity.
#[derive(Debug, Clone)]
pub struct LatencyWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, millis: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(millis);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Nearest-rank percentile (`p` in 0..=100). `None` when empty.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        Some(nearest_rank(&sorted, p))
    }

    /// Count plus p50/p95, sorting once.
    pub fn summary(&self) -> WindowSummary {
        if self.samples.is_empty() {
            return WindowSummary::default();
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        WindowSummary {
            count: sorted.len(),
            p50: Some(nearest_rank(&sorted, 50.0)),
            p95: Some(nearest_rank(&sorted, 95.0)),
        }
    }
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let rank = ((p.clamp(0.0, 100.0) / 100.0) * n as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(n - 1)]
}

/// Percentile summary of one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowSummary {
    pub count: usize,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
}

impl fmt::Display for WindowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.p50, self.p95) {
            (Some(p50), Some(p95)) => write!(f, "{p50:.1}/{p95:.1}"),
            _ => f.write_str("-/-"),
        }
    }
}

/// Summaries of all three windows at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencySummaries {
    pub enqueue: WindowSummary,
    pub queue_wait: WindowSummary,
    pub handler: WindowSummary,
}

/// Process-wide latency sampler shared by the ingestion path and all workers.
#[derive(Debug)]
pub struct MetricsSampler {
    enqueue: Mutex<LatencyWindow>,
    queue_wait: Mutex<LatencyWindow>,
    handler: Mutex<LatencyWindow>,
}

impl MetricsSampler {
    /// Creates a sampler whose windows each retain `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            enqueue: Mutex::new(LatencyWindow::new(capacity)),
            queue_wait: Mutex::new(LatencyWindow::new(capacity)),
            handler: Mutex::new(LatencyWindow::new(capacity)),
        }
    }

    /// Records a duration sample into `window`.
    pub fn record(&self, window: Window, elapsed: Duration) {
        self.record_ms(window, elapsed.as_secs_f64() * 1000.0);
    }

    /// Records a millisecond sample into `window`.
    pub fn record_ms(&self, window: Window, millis: f64) {
        self.slot(window)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(millis);

        #[cfg(feature = "prometheus")]
        snapclaim_prometheus::record_latency(window.as_str(), millis);
    }

    pub fn summary(&self, window: Window) -> WindowSummary {
        self.slot(window)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    pub fn summaries(&self) -> LatencySummaries {
        LatencySummaries {
            enqueue: self.summary(Window::Enqueue),
            queue_wait: self.summary(Window::QueueWait),
            handler: self.summary(Window::Handler),
        }
    }

    fn slot(&self, window: Window) -> &Mutex<LatencyWindow> {
        match window {
            Window::Enqueue => &self.enqueue,
            Window::QueueWait => &self.queue_wait,
            Window::Handler => &self.handler,
        }
    }
}

/// Events counted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Every event handed to the ingestion handler.
    Seen,
    /// Events that passed source, authorship, and admission checks.
    Allowed,
    /// Events dropped because their identity was already claimed.
    Duplicate,
    Enqueued,
    /// Events shed because the work queue was full.
    Dropped,
    Clicked,
    Failed,
    Skipped,
    NoMatch,
    /// Worker iterations that panicked.
    WorkerFault,
}

impl Counter {
    const ALL: [Counter; 10] = [
        Counter::Seen,
        Counter::Allowed,
        Counter::Duplicate,
        Counter::Enqueued,
        Counter::Dropped,
        Counter::Clicked,
        Counter::Failed,
        Counter::Skipped,
        Counter::NoMatch,
        Counter::WorkerFault,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Counter::Seen => "seen",
            Counter::Allowed => "allowed",
            Counter::Duplicate => "duplicate",
            Counter::Enqueued => "enqueued",
            Counter::Dropped => "dropped",
            Counter::Clicked => "clicked",
            Counter::Failed => "failed",
            Counter::Skipped => "skipped",
            Counter::NoMatch => "no_match",
            Counter::WorkerFault => "worker_fault",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Lock-free pipeline counters.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    values: [AtomicU64; Counter::ALL.len()],
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, counter: Counter) {
        self.values[counter.index()].fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "prometheus")]
        snapclaim_prometheus::record_pipeline_event(counter.as_str());
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.values[counter.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            seen: self.get(Counter::Seen),
            allowed: self.get(Counter::Allowed),
            duplicate: self.get(Counter::Duplicate),
            enqueued: self.get(Counter::Enqueued),
            dropped: self.get(Counter::Dropped),
            clicked: self.get(Counter::Clicked),
            failed: self.get(Counter::Failed),
            skipped: self.get(Counter::Skipped),
            no_match: self.get(Counter::NoMatch),
            worker_faults: self.get(Counter::WorkerFault),
        }
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub seen: u64,
    pub allowed: u64,
    pub duplicate: u64,
    pub enqueued: u64,
    pub dropped: u64,
    pub clicked: u64,
    pub failed: u64,
    pub skipped: u64,
    pub no_match: u64,
    pub worker_faults: u64,
}
