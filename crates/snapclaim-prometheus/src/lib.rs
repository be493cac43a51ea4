// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics exporter for snapclaim.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The recorder is
//! installed globally and an HTTP listener serves the text format on the
//! configured address.

pub mod recording;

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
pub use metrics_exporter_prometheus::PrometheusHandle;

use snapclaim_core::SnapclaimError;

pub use recording::{
    record_latency, record_pipeline_event, register_metrics, set_dedup_entries, set_queue_depth,
};

/// Install the recorder globally and serve `/metrics` on `listen_address`.
///
/// Only one recorder can be installed per process. Must be called from
/// within a tokio runtime, which drives the HTTP listener. The returned
/// handle renders the same text the listener serves.
pub fn install(listen_address: SocketAddr) -> Result<PrometheusHandle, SnapclaimError> {
    let (recorder, exporter) = PrometheusBuilder::new()
        .with_http_listener(listen_address)
        .build()
        .map_err(|e| SnapclaimError::Internal(format!("failed to build Prometheus exporter: {e}")))?;
    let handle = recorder.handle();

    metrics::set_global_recorder(recorder).map_err(|e| {
        SnapclaimError::Internal(format!("failed to install Prometheus recorder: {e}"))
    })?;

    tokio::spawn(async move {
        if let Err(e) = exporter.await {
            tracing::error!(error = ?e, "prometheus exporter stopped");
        }
    });

    recording::register_metrics();

    tracing::info!(%listen_address, "prometheus metrics exporter installed");

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only one global recorder can be installed per process, so this is the
    // single test that calls install().
    #[tokio::test]
    async fn install_serves_rendered_metrics() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let handle = install(addr).unwrap();

        record_pipeline_event("enqueued");
        let rendered = handle.render();
        assert!(rendered.contains("snapclaim_events_total"), "got: {rendered}");
        assert!(rendered.contains("stage=\"enqueued\""), "got: {rendered}");
    }
}
