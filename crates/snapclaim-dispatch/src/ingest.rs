// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry point for inbound events.
//!
//! Runs the cheap checks in order (source policy, authorship, allowlists,
//! element presence, dedup peek) and enqueues the survivors. Nothing here
//! awaits: a rejected or shed event returns immediately so the event
//! source's delivery loop never stalls.

use std::sync::Arc;

use snapclaim_core::{EventSource, MessageSnapshot};
use tracing::{debug, warn};

use crate::executor::tenths;
use crate::filter::{AdmissionFilter, Rejection};
use crate::metrics::{Counter, MetricsSampler, PipelineCounters, Window};
use crate::queue::{EnqueueError, QueuedTask, WorkQueue};
use crate::registry::DedupRegistry;

/// What the ingestion handler did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The event kind is disabled by configuration.
    SourceIgnored,
    Rejected(Rejection),
    /// The identity is already claimed.
    Duplicate,
    Enqueued,
    /// The work queue was full; the event was dropped.
    QueueFull,
    /// The pipeline is shutting down.
    Closed,
}

/// Which event kinds reach full processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    pub on_message: bool,
    pub on_edit: bool,
}

impl SourcePolicy {
    pub fn accepts(self, source: EventSource) -> bool {
        match source {
            EventSource::Created => self.on_message,
            EventSource::Edited => self.on_edit,
        }
    }
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            on_message: true,
            on_edit: true,
        }
    }
}

/// Cloneable handle given to the event source.
#[derive(Clone)]
pub struct IngestionHandler {
    policy: SourcePolicy,
    filter: Arc<AdmissionFilter>,
    registry: Arc<DedupRegistry>,
    queue: Arc<WorkQueue>,
    sampler: Arc<MetricsSampler>,
    counters: Arc<PipelineCounters>,
}

impl IngestionHandler {
    pub fn new(
        policy: SourcePolicy,
        filter: Arc<AdmissionFilter>,
        registry: Arc<DedupRegistry>,
        queue: Arc<WorkQueue>,
        sampler: Arc<MetricsSampler>,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            policy,
            filter,
            registry,
            queue,
            sampler,
            counters,
        }
    }

    /// A new message arrived.
    pub fn on_message_created(&self, snapshot: Arc<MessageSnapshot>) -> IngestOutcome {
        self.handle(snapshot, EventSource::Created)
    }

    /// A message was edited. Only the new state is inspected.
    pub fn on_message_edited(
        &self,
        _previous: Option<Arc<MessageSnapshot>>,
        snapshot: Arc<MessageSnapshot>,
    ) -> IngestOutcome {
        self.handle(snapshot, EventSource::Edited)
    }

    /// Runs the admission chain and enqueues on success.
    pub fn handle(&self, snapshot: Arc<MessageSnapshot>, source: EventSource) -> IngestOutcome {
        let task = QueuedTask::new(snapshot, source);
        let snapshot = &task.snapshot;
        self.counters.increment(Counter::Seen);

        if !self.policy.accepts(source) {
            return IngestOutcome::SourceIgnored;
        }

        let now = task.received_wall;
        debug!(
            message_id = %snapshot.id,
            %source,
            created_age_ms = tenths(snapshot.created_age_ms(now)),
            edited_age_ms = ?snapshot.edited_age_ms(now).map(tenths),
            "event received"
        );

        if let Err(rejection) = self.filter.check(snapshot) {
            debug!(
                message_id = %snapshot.id,
                guild_id = ?snapshot.guild_id,
                channel_id = ?snapshot.channel_id,
                %rejection,
                "event rejected"
            );
            return IngestOutcome::Rejected(rejection);
        }
        self.counters.increment(Counter::Allowed);

        if self.registry.contains(snapshot.id) {
            debug!(message_id = %snapshot.id, %source, "already claimed, not enqueued");
            self.counters.increment(Counter::Duplicate);
            return IngestOutcome::Duplicate;
        }

        let received_at = task.received_at;
        let id = snapshot.id;
        match self.queue.try_enqueue(task) {
            Ok(()) => {
                self.sampler.record(Window::Enqueue, received_at.elapsed());
                self.counters.increment(Counter::Enqueued);
                IngestOutcome::Enqueued
            }
            Err(EnqueueError::Full(_)) => {
                warn!(
                    message_id = %id,
                    %source,
                    capacity = self.queue.capacity(),
                    "work queue full, dropping event"
                );
                self.counters.increment(Counter::Dropped);
                IngestOutcome::QueueFull
            }
            Err(EnqueueError::Closed(_)) => {
                debug!(message_id = %id, "pipeline closed, dropping event");
                IngestOutcome::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use snapclaim_core::MessageId;
    use snapclaim_test_utils::{SnapshotBuilder, button};
    use tracing_test::traced_test;

    use super::*;

    struct Fixture {
        handler: IngestionHandler,
        registry: Arc<DedupRegistry>,
        queue: Arc<WorkQueue>,
        counters: Arc<PipelineCounters>,
        sampler: Arc<MetricsSampler>,
    }

    fn fixture(policy: SourcePolicy, filter: AdmissionFilter, capacity: usize) -> Fixture {
        let registry = Arc::new(DedupRegistry::new());
        let queue = Arc::new(WorkQueue::new(capacity));
        let counters = Arc::new(PipelineCounters::new());
        let sampler = Arc::new(MetricsSampler::new(16));
        let handler = IngestionHandler::new(
            policy,
            Arc::new(filter),
            Arc::clone(&registry),
            Arc::clone(&queue),
            Arc::clone(&sampler),
            Arc::clone(&counters),
        );
        Fixture {
            handler,
            registry,
            queue,
            counters,
            sampler,
        }
    }

    fn claimable(id: u64) -> Arc<MessageSnapshot> {
        SnapshotBuilder::new(id)
            .guild(1)
            .channel(2)
            .row([button("Claim Gift", "x")])
            .build_arc()
    }

    #[tokio::test]
    async fn admitted_event_is_enqueued() {
        let f = fixture(SourcePolicy::default(), AdmissionFilter::default(), 8);
        assert_eq!(f.handler.on_message_created(claimable(1)), IngestOutcome::Enqueued);
        assert_eq!(f.queue.depth(), 1);
        assert_eq!(f.counters.get(Counter::Seen), 1);
        assert_eq!(f.counters.get(Counter::Allowed), 1);
        assert_eq!(f.counters.get(Counter::Enqueued), 1);
        assert_eq!(f.sampler.summary(Window::Enqueue).count, 1);

        let task = f.queue.dequeue().await.unwrap();
        assert_eq!(task.snapshot.id, MessageId(1));
        assert_eq!(task.source, EventSource::Created);
    }

    #[test]
    fn edit_only_policy_ignores_new_messages() {
        let policy = SourcePolicy {
            on_message: false,
            on_edit: true,
        };
        let f = fixture(policy, AdmissionFilter::default(), 8);
        assert_eq!(f.handler.on_message_created(claimable(1)), IngestOutcome::SourceIgnored);
        assert_eq!(
            f.handler.on_message_edited(None, claimable(1)),
            IngestOutcome::Enqueued
        );
        assert_eq!(f.counters.get(Counter::Seen), 2);
        assert_eq!(f.counters.get(Counter::Allowed), 1);
    }

    #[test]
    fn rejections_never_enqueue() {
        let filter = AdmissionFilter::new(HashSet::from([99]), HashSet::new());
        let f = fixture(SourcePolicy::default(), filter, 8);

        assert_eq!(
            f.handler.on_message_created(claimable(1)),
            IngestOutcome::Rejected(Rejection::GuildNotAllowed)
        );

        let bare = SnapshotBuilder::new(2).guild(99).build_arc();
        assert_eq!(
            f.handler.on_message_created(bare),
            IngestOutcome::Rejected(Rejection::NoInteractiveElements)
        );

        let own = SnapshotBuilder::new(3)
            .guild(99)
            .from_self()
            .row([button("Claim Gift", "x")])
            .build_arc();
        assert_eq!(
            f.handler.on_message_created(own),
            IngestOutcome::Rejected(Rejection::SelfAuthored)
        );
        assert_eq!(f.queue.depth(), 0);
    }

    #[test]
    fn claimed_identity_is_not_enqueued() {
        let f = fixture(SourcePolicy::default(), AdmissionFilter::default(), 8);
        assert!(f.registry.try_claim(MessageId(5)));
        assert_eq!(
            f.handler.on_message_edited(Some(claimable(5)), claimable(5)),
            IngestOutcome::Duplicate
        );
        assert_eq!(f.queue.depth(), 0);
        assert_eq!(f.counters.get(Counter::Duplicate), 1);
    }

    #[test]
    fn unclaimed_duplicates_are_enqueued_twice() {
        // The peek does not claim, so the executor's claim step arbitrates.
        let f = fixture(SourcePolicy::default(), AdmissionFilter::default(), 8);
        assert_eq!(f.handler.on_message_created(claimable(6)), IngestOutcome::Enqueued);
        assert_eq!(f.handler.on_message_edited(None, claimable(6)), IngestOutcome::Enqueued);
        assert_eq!(f.queue.depth(), 2);
    }

    #[test]
    #[traced_test]
    fn full_queue_sheds() {
        let f = fixture(SourcePolicy::default(), AdmissionFilter::default(), 1);
        assert_eq!(f.handler.on_message_created(claimable(1)), IngestOutcome::Enqueued);
        assert_eq!(f.handler.on_message_created(claimable(2)), IngestOutcome::QueueFull);
        assert_eq!(f.queue.depth(), 1);
        assert_eq!(f.counters.get(Counter::Dropped), 1);
        assert!(logs_contain("work queue full, dropping event"));
    }
}
