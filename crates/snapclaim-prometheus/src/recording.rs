// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_gauge, describe_histogram};

const EVENTS_TOTAL: &str = "snapclaim_events_total";
const CLICKS_TOTAL: &str = "snapclaim_clicks_total";
const WORKER_FAULTS_TOTAL: &str = "snapclaim_worker_faults_total";
const QUEUE_DEPTH: &str = "snapclaim_queue_depth";
const DEDUP_ENTRIES: &str = "snapclaim_dedup_entries";
const ENQUEUE_LATENCY: &str = "snapclaim_enqueue_latency_ms";
const QUEUE_WAIT_LATENCY: &str = "snapclaim_queue_wait_latency_ms";
const HANDLER_LATENCY: &str = "snapclaim_handler_latency_ms";

/// Register all snapclaim metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(EVENTS_TOTAL, "Inbound events by pipeline stage");
    describe_counter!(CLICKS_TOTAL, "Click attempts by result");
    describe_counter!(WORKER_FAULTS_TOTAL, "Worker iterations that panicked");
    describe_gauge!(QUEUE_DEPTH, "Tasks waiting in the work queue");
    describe_gauge!(DEDUP_ENTRIES, "Identities held by the dedup registry");
    describe_histogram!(ENQUEUE_LATENCY, "Event receipt to enqueue, in milliseconds");
    describe_histogram!(QUEUE_WAIT_LATENCY, "Time spent queued, in milliseconds");
    describe_histogram!(HANDLER_LATENCY, "Click executor run time, in milliseconds");
}

/// Record one pipeline event by its counter name.
///
/// Click outcomes (`clicked`, `failed`, `skipped`, `no_match`) land in
/// `snapclaim_clicks_total{result}`; every other stage in
/// `snapclaim_events_total{stage}`.
pub fn record_pipeline_event(event: &'static str) {
    match event {
        "clicked" | "failed" | "skipped" | "no_match" => {
            metrics::counter!(CLICKS_TOTAL, "result" => event).increment(1);
        }
        "worker_fault" => metrics::counter!(WORKER_FAULTS_TOTAL).increment(1),
        stage => metrics::counter!(EVENTS_TOTAL, "stage" => stage).increment(1),
    }
}

/// Set the current work queue depth.
pub fn set_queue_depth(depth: f64) {
    metrics::gauge!(QUEUE_DEPTH).set(depth);
}

/// Set the current dedup registry size.
pub fn set_dedup_entries(entries: f64) {
    metrics::gauge!(DEDUP_ENTRIES).set(entries);
}

/// Record a latency sample for one of the pipeline windows.
///
/// `window` is `enqueue`, `wait`, or `handler`; anything else is ignored.
pub fn record_latency(window: &str, millis: f64) {
    let name = match window {
        "enqueue" => ENQUEUE_LATENCY,
        "wait" => QUEUE_WAIT_LATENCY,
        "handler" => HANDLER_LATENCY,
        _ => return,
    };
    metrics::histogram!(name).record(millis);
}

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[test]
    fn events_render_under_expected_names() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            register_metrics();
            record_pipeline_event("seen");
            record_pipeline_event("seen");
            record_pipeline_event("clicked");
            record_pipeline_event("worker_fault");
            set_queue_depth(3.0);
            set_dedup_entries(1.0);
            record_latency("handler", 12.5);
            record_latency("bogus", 1.0);
        });

        let rendered = handle.render();
        assert!(
            rendered.contains("snapclaim_events_total{stage=\"seen\"} 2"),
            "got: {rendered}"
        );
        assert!(
            rendered.contains("snapclaim_clicks_total{result=\"clicked\"} 1"),
            "got: {rendered}"
        );
        assert!(rendered.contains("snapclaim_worker_faults_total 1"), "got: {rendered}");
        assert!(rendered.contains("snapclaim_queue_depth"), "got: {rendered}");
        assert!(rendered.contains("snapclaim_dedup_entries"), "got: {rendered}");
        assert!(rendered.contains("snapclaim_handler_latency_ms"), "got: {rendered}");
        assert!(!rendered.contains("bogus"), "got: {rendered}");
    }
}
