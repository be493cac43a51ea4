// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `snapclaim serve` command implementation.
//!
//! Builds the dispatch pipeline around the Discord interaction clicker,
//! connects the gateway, and runs until SIGINT or SIGTERM. Queued tasks are
//! discarded on shutdown.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use snapclaim_config::model::SnapclaimConfig;
use snapclaim_core::SnapclaimError;
use snapclaim_discord::{Credentials, DiscordGateway, GatewaySession, InteractionClicker};
use snapclaim_dispatch::shutdown::{install_signal_handler, join_with_grace};
use snapclaim_dispatch::{Pipeline, PipelineSettings};
use tokio::task::JoinError;
use tracing::info;

#[cfg(feature = "prometheus")]
use std::net::SocketAddr;

#[cfg(feature = "prometheus")]
use snapclaim_prometheus::PrometheusHandle;

/// How long background tasks get to stop after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runs the `snapclaim serve` command.
///
/// Returns an error when the gateway rejects the session, so the process
/// exits non-zero instead of reconnecting forever.
pub async fn run_serve(config: SnapclaimConfig) -> Result<(), SnapclaimError> {
    init_tracing(&config.daemon.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting snapclaim serve");

    let _metrics = install_prometheus(&config)?;

    let credentials = Credentials::new(config.discord.token.as_deref().unwrap_or_default())?;
    let cancel = install_signal_handler();

    let settings = PipelineSettings::from_config(&config);
    let summary = allowlist_summary(&settings);

    let session = Arc::new(GatewaySession::new());
    let clicker = InteractionClicker::new(credentials.clone(), Arc::clone(&session))?;
    let pipeline = Pipeline::start(settings, Arc::new(clicker), cancel.clone());

    let gateway = DiscordGateway::new(credentials, pipeline.ingest(), session, summary);
    let mut gateway_task = tokio::spawn(gateway.run(cancel.clone()));

    let gateway_exit = tokio::select! {
        _ = cancel.cancelled() => None,
        joined = &mut gateway_task => Some(joined),
    };

    match gateway_exit {
        None => {
            info!("shutdown signal received, stopping");
            pipeline.shutdown(SHUTDOWN_GRACE).await;
            join_with_grace(vec![gateway_task], SHUTDOWN_GRACE).await;
            info!("snapclaim serve shutdown complete");
            Ok(())
        }
        Some(joined) => {
            cancel.cancel();
            pipeline.shutdown(SHUTDOWN_GRACE).await;
            gateway_outcome(joined)
        }
    }
}

/// Maps a gateway task that ended on its own to the command result.
fn gateway_outcome(
    joined: Result<Result<(), SnapclaimError>, JoinError>,
) -> Result<(), SnapclaimError> {
    match joined {
        Ok(Ok(())) => Err(SnapclaimError::Internal(
            "gateway stopped without a shutdown signal".into(),
        )),
        Ok(Err(e)) => Err(e),
        Err(e) => Err(SnapclaimError::gateway("gateway task failed", e)),
    }
}

/// Installs the exporter when `[prometheus] enabled = true`.
#[cfg(feature = "prometheus")]
fn install_prometheus(
    config: &SnapclaimConfig,
) -> Result<Option<PrometheusHandle>, SnapclaimError> {
    if !config.prometheus.enabled {
        return Ok(None);
    }
    let addr: SocketAddr = config
        .prometheus
        .listen_address
        .trim()
        .parse()
        .map_err(|e| SnapclaimError::Config(format!("invalid prometheus.listen_address: {e}")))?;
    snapclaim_prometheus::install(addr).map(Some)
}

#[cfg(not(feature = "prometheus"))]
fn install_prometheus(config: &SnapclaimConfig) -> Result<Option<()>, SnapclaimError> {
    if config.prometheus.enabled {
        tracing::warn!("prometheus.enabled is set but this build has no prometheus support");
    }
    Ok(None)
}

fn format_ids(ids: &HashSet<u64>) -> String {
    if ids.is_empty() {
        return "all".to_string();
    }
    let mut sorted: Vec<u64> = ids.iter().copied().collect();
    sorted.sort_unstable();
    let joined: Vec<String> = sorted.iter().map(u64::to_string).collect();
    joined.join(",")
}

/// Effective allowlists as logged on every gateway `READY`.
pub fn allowlist_summary(settings: &PipelineSettings) -> String {
    format!(
        "guilds={} channels={}",
        format_ids(&settings.allowed_guilds),
        format_ids(&settings.allowed_channels)
    )
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` takes precedence over `daemon.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("snapclaim={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_all_for_empty_allowlists() {
        let settings = PipelineSettings::default();
        assert_eq!(allowlist_summary(&settings), "guilds=all channels=all");
    }

    #[test]
    fn summary_sorts_ids() {
        let mut settings = PipelineSettings::default();
        settings.allowed_guilds = [30, 10, 20].into_iter().collect();
        settings.allowed_channels = [7].into_iter().collect();
        assert_eq!(allowlist_summary(&settings), "guilds=10,20,30 channels=7");
    }

    #[test]
    fn rejected_session_is_the_command_error() {
        let rejected = gateway_outcome(Ok(Err(SnapclaimError::Config(
            "discord gateway rejected the session".into(),
        ))));
        assert!(matches!(rejected, Err(SnapclaimError::Config(_))));
    }

    #[test]
    fn unprompted_gateway_exit_is_an_error() {
        assert!(matches!(gateway_outcome(Ok(Ok(()))), Err(SnapclaimError::Internal(_))));
    }

    #[tokio::test]
    async fn panicked_gateway_task_is_a_gateway_error() {
        let joined = tokio::spawn(async {
            if true {
                panic!("boom");
            }
            Ok::<(), SnapclaimError>(())
        })
        .await;
        let outcome = gateway_outcome(joined);
        assert!(matches!(outcome, Err(SnapclaimError::Gateway { .. })));
    }

    #[test]
    fn prometheus_disabled_installs_nothing() {
        let config = SnapclaimConfig::default();
        assert!(install_prometheus(&config).unwrap().is_none());
    }
}
