// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the dispatch pipeline.
//!
//! These drive a real `Pipeline` (workers, cleanup, stats) against the
//! `MockClickAdapter` from snapclaim-test-utils.

use std::sync::Arc;
use std::time::Duration;

use snapclaim_core::{ClickAdapter, MessageId};
use snapclaim_dispatch::{IngestOutcome, Pipeline, PipelineSettings, Rejection};
use snapclaim_test_utils::{MockClickAdapter, MockOutcome, SnapshotBuilder, button, link_button};
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

fn settings() -> PipelineSettings {
    PipelineSettings {
        workers: 2,
        queue_capacity: 16,
        ..PipelineSettings::default()
    }
}

fn start(settings: PipelineSettings, clicker: Arc<MockClickAdapter>) -> Pipeline {
    let clicker: Arc<dyn ClickAdapter> = clicker;
    Pipeline::start(settings, clicker, CancellationToken::new())
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn claim_gift_is_clicked_once_and_never_reprocessed() {
    let clicker = Arc::new(MockClickAdapter::new());
    let pipeline = start(settings(), Arc::clone(&clicker));
    let ingest = pipeline.ingest();

    let snapshot = SnapshotBuilder::new(42).row([button("Claim Gift", "abc")]).build_arc();
    assert_eq!(ingest.on_message_created(Arc::clone(&snapshot)), IngestOutcome::Enqueued);

    assert!(clicker.wait_for_calls(1, WAIT).await);
    wait_until(|| pipeline.stats().snapshot().counters.clicked == 1).await;
    assert!(pipeline.registry().contains(MessageId(42)));

    // The identical snapshot arriving again within the TTL is a duplicate.
    assert_eq!(
        ingest.on_message_edited(Some(Arc::clone(&snapshot)), Arc::clone(&snapshot)),
        IngestOutcome::Duplicate
    );
    assert_eq!(ingest.on_message_created(snapshot), IngestOutcome::Duplicate);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let calls = clicker.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].message_id, MessageId(42));
    assert_eq!(calls[0].custom_id.as_deref(), Some("abc"));

    let stats = pipeline.stats().snapshot();
    assert_eq!(stats.counters.seen, 3);
    assert_eq!(stats.counters.enqueued, 1);
    assert_eq!(stats.counters.duplicate, 2);
    assert_eq!(stats.latency.handler.count, 1);
    assert_eq!(stats.latency.queue_wait.count, 1);

    pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_message_and_edit_click_once() {
    // A slow click keeps the first task in flight while the edit is enqueued.
    let clicker = Arc::new(MockClickAdapter::new().with_delay(Duration::from_millis(50)));
    let pipeline = start(
        PipelineSettings {
            workers: 4,
            ..settings()
        },
        Arc::clone(&clicker),
    );
    let ingest = pipeline.ingest();

    let snapshot = SnapshotBuilder::new(7).row([button("Claim Gift", "x")]).build_arc();
    for _ in 0..4 {
        let outcome = ingest.on_message_edited(None, Arc::clone(&snapshot));
        assert!(matches!(outcome, IngestOutcome::Enqueued | IngestOutcome::Duplicate));
    }

    wait_until(|| {
        let c = pipeline.stats().snapshot().counters;
        c.clicked + c.skipped == c.enqueued
    })
    .await;

    let stats = pipeline.stats().snapshot();
    assert_eq!(stats.counters.clicked, 1);
    assert_eq!(clicker.call_count().await, 1);

    pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failures_and_faults_are_absorbed() {
    let clicker = Arc::new(MockClickAdapter::with_script([
        MockOutcome::Fail("status 400".into()),
        MockOutcome::Panic,
    ]));
    let pipeline = start(
        PipelineSettings {
            workers: 1,
            ..settings()
        },
        Arc::clone(&clicker),
    );
    let ingest = pipeline.ingest();

    for id in 1..=3 {
        let snapshot = SnapshotBuilder::new(id).row([button("Claim Gift", "x")]).build_arc();
        assert_eq!(ingest.on_message_created(snapshot), IngestOutcome::Enqueued);
    }

    wait_until(|| pipeline.stats().snapshot().counters.clicked == 1).await;
    let counters = pipeline.stats().snapshot().counters;
    assert_eq!(counters.failed, 1);
    assert_eq!(counters.worker_faults, 1);
    assert_eq!(clicker.call_count().await, 3);

    pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn filtered_and_unmatched_events_never_click() {
    let clicker = Arc::new(MockClickAdapter::new());
    let mut settings = settings();
    settings.allowed_channels.insert(500);
    let pipeline = start(settings, Arc::clone(&clicker));
    let ingest = pipeline.ingest();

    let elsewhere = SnapshotBuilder::new(1)
        .channel(501)
        .row([button("Claim Gift", "x")])
        .build_arc();
    assert_eq!(
        ingest.on_message_created(elsewhere),
        IngestOutcome::Rejected(Rejection::ChannelNotAllowed)
    );

    let link_only = SnapshotBuilder::new(2)
        .channel(500)
        .row([link_button("Claim Gift", "https://example.com")])
        .build_arc();
    assert_eq!(ingest.on_message_created(link_only), IngestOutcome::Enqueued);

    wait_until(|| pipeline.stats().snapshot().counters.no_match == 1).await;
    assert_eq!(clicker.call_count().await, 0);
    assert!(!pipeline.registry().contains(MessageId(2)));

    pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn edit_only_policy_skips_new_messages() {
    let clicker = Arc::new(MockClickAdapter::new());
    let pipeline = start(
        PipelineSettings {
            on_message: false,
            ..settings()
        },
        Arc::clone(&clicker),
    );
    let ingest = pipeline.ingest();

    let snapshot = SnapshotBuilder::new(9).row([button("Claim Gift", "x")]).build_arc();
    assert_eq!(
        ingest.on_message_created(Arc::clone(&snapshot)),
        IngestOutcome::SourceIgnored
    );
    assert_eq!(ingest.on_message_edited(None, snapshot), IngestOutcome::Enqueued);
    assert!(clicker.wait_for_calls(1, WAIT).await);

    pipeline.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn ingestion_after_shutdown_is_refused() {
    let clicker = Arc::new(MockClickAdapter::new());
    let pipeline = start(settings(), Arc::clone(&clicker));
    let ingest = pipeline.ingest();
    pipeline.shutdown(Duration::from_secs(1)).await;
    assert!(clicker.is_shut_down());

    let snapshot = SnapshotBuilder::new(1).row([button("Claim Gift", "x")]).build_arc();
    assert_eq!(ingest.on_message_created(snapshot), IngestOutcome::Closed);
}
