// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locates the claim element on a snapshot and activates it at most once.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use snapclaim_core::{ClickAdapter, ClickResult, EventSource, InteractiveElement, MessageSnapshot};
use tracing::{debug, error, info};

use crate::metrics::{Counter, PipelineCounters};
use crate::registry::DedupRegistry;

/// Outcome of scanning a snapshot for a claim target.
#[derive(Debug, PartialEq)]
pub enum ScanOutcome<'a> {
    /// First enabled, non-link element with an action id and a matching label.
    Target(&'a InteractiveElement),
    /// Some label matched but none of those elements could be activated.
    MatchedNotActionable,
    /// No label matched.
    NoLabelMatch,
}

/// Scans rows and elements in display order for the first actionable match.
///
/// Disabled and non-actionable matches are logged and skipped; scanning
/// continues past them.
pub fn find_target<'a>(snapshot: &'a MessageSnapshot, labels: &HashSet<String>) -> ScanOutcome<'a> {
    let mut matched = false;

    for element in snapshot.elements() {
        let normalized = element.normalized_label();
        if !labels.contains(&normalized) {
            continue;
        }
        matched = true;

        if element.disabled {
            info!(
                message_id = %snapshot.id,
                label = element.label(),
                "claim element is disabled, continuing scan"
            );
            continue;
        }
        if element.is_link() || element.action_id().is_none() {
            info!(
                message_id = %snapshot.id,
                label = element.label(),
                is_link = element.is_link(),
                "claim element is not actionable, continuing scan"
            );
            continue;
        }
        return ScanOutcome::Target(element);
    }

    if matched {
        ScanOutcome::MatchedNotActionable
    } else {
        ScanOutcome::NoLabelMatch
    }
}

/// Rounds a millisecond value to one decimal place for logging.
pub(crate) fn tenths(ms: f64) -> f64 {
    (ms * 10.0).round() / 10.0
}

/// Runs one click attempt per dequeued task.
///
/// Shared by every worker; holds only `Arc`s.
#[derive(Clone)]
pub struct ClickExecutor {
    labels: Arc<HashSet<String>>,
    registry: Arc<DedupRegistry>,
    clicker: Arc<dyn ClickAdapter>,
    counters: Arc<PipelineCounters>,
}

impl ClickExecutor {
    pub fn new(
        labels: Arc<HashSet<String>>,
        registry: Arc<DedupRegistry>,
        clicker: Arc<dyn ClickAdapter>,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            labels,
            registry,
            clicker,
            counters,
        }
    }

    /// Scans `snapshot`, claims its identity, and activates the target once.
    ///
    /// Never retries: a failed activation is reported as [`ClickResult::Failed`].
    pub async fn attempt(
        &self,
        snapshot: &MessageSnapshot,
        received_at: DateTime<Utc>,
        source: EventSource,
    ) -> ClickResult {
        let element = match find_target(snapshot, &self.labels) {
            ScanOutcome::Target(element) => element,
            ScanOutcome::MatchedNotActionable => {
                info!(
                    message_id = %snapshot.id,
                    %source,
                    "claim label found but no element was actionable"
                );
                self.counters.increment(Counter::NoMatch);
                return ClickResult::NoMatch;
            }
            ScanOutcome::NoLabelMatch => {
                debug!(message_id = %snapshot.id, %source, "no claim label on message");
                self.counters.increment(Counter::NoMatch);
                return ClickResult::NoMatch;
            }
        };

        if !self.registry.try_claim(snapshot.id) {
            debug!(message_id = %snapshot.id, %source, "already claimed, skipping");
            self.counters.increment(Counter::Skipped);
            return ClickResult::Skipped;
        }

        let now = Utc::now();
        let age_ms = tenths(snapshot.created_age_ms(now));
        let since_event_ms = tenths(
            (now - received_at)
                .num_microseconds()
                .map_or(0.0, |us| us as f64 / 1000.0),
        );
        let action_id = element.action_id().unwrap_or_default();

        match self.clicker.activate(snapshot, element).await {
            Ok(()) => {
                info!(
                    message_id = %snapshot.id,
                    channel_id = ?snapshot.channel_id,
                    label = element.label(),
                    %source,
                    age_ms,
                    since_event_ms,
                    "clicked"
                );
                self.counters.increment(Counter::Clicked);
                ClickResult::Clicked
            }
            Err(e) => {
                error!(
                    message_id = %snapshot.id,
                    channel_id = ?snapshot.channel_id,
                    action_id,
                    is_link = element.is_link(),
                    disabled = element.disabled,
                    %source,
                    age_ms,
                    since_event_ms,
                    error = %e,
                    "click failed"
                );
                self.counters.increment(Counter::Failed);
                ClickResult::Failed
            }
        }
    }

    pub fn registry(&self) -> &Arc<DedupRegistry> {
        &self.registry
    }
}
