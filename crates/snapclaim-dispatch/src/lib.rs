// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatch and deduplication pipeline for snapclaim.
//!
//! Inbound events flow through the [`IngestionHandler`] (cheap filters and a
//! dedup peek) into a bounded [`WorkQueue`]. A fixed [`WorkerPool`] drains
//! the queue and runs the [`ClickExecutor`], which claims the message
//! identity in the [`DedupRegistry`] and activates the matching element at
//! most once. Timing samples and counters feed the [`StatsReporter`].
//!
//! [`Pipeline::start`] wires all of it together.

pub mod cleanup;
pub mod executor;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod settings;
pub mod shutdown;
pub mod stats;
pub mod worker;

pub use executor::ClickExecutor;
pub use filter::{AdmissionFilter, Rejection};
pub use ingest::{IngestOutcome, IngestionHandler, SourcePolicy};
pub use metrics::{Counter, MetricsSampler, PipelineCounters, Window};
pub use pipeline::Pipeline;
pub use queue::{QueuedTask, WorkQueue};
pub use registry::DedupRegistry;
pub use settings::PipelineSettings;
pub use stats::{StatsReporter, StatsSnapshot};
pub use worker::WorkerPool;
