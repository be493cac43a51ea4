// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord adapter for snapclaim.
//!
//! [`DiscordGateway`] keeps a user-session gateway connection alive and feeds
//! message and edit events into the dispatch pipeline through
//! [`handler::ClaimHandler`]. [`click::InteractionClicker`] implements
//! [`ClickAdapter`](snapclaim_core::ClickAdapter) over the HTTP API using the
//! session recorded by the gateway. Both authenticate with the same
//! [`Credentials`].

pub mod click;
pub mod credentials;
pub mod gateway;
pub mod handler;
pub mod model;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use snapclaim_core::SnapclaimError;
use snapclaim_dispatch::IngestionHandler;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use click::InteractionClicker;
pub use credentials::Credentials;
pub use gateway::{GatewayError, DEFAULT_GATEWAY_URL};
pub use handler::ClaimHandler;
pub use session::GatewaySession;

const INITIAL_BACKOFF: Duration = Duration::from_secs(5);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// A connection that lasted this long resets the backoff.
const STABLE_THRESHOLD: Duration = Duration::from_secs(60);

/// Next reconnect delay: doubled, capped at one minute.
pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Gateway connection feeding the ingestion handler.
pub struct DiscordGateway {
    credentials: Credentials,
    url: String,
    handler: ClaimHandler,
    session: Arc<GatewaySession>,
}

impl DiscordGateway {
    /// Creates a gateway adapter against [`DEFAULT_GATEWAY_URL`].
    pub fn new(
        credentials: Credentials,
        ingest: IngestionHandler,
        session: Arc<GatewaySession>,
        allowlist_summary: String,
    ) -> Self {
        let handler = ClaimHandler::new(ingest, Arc::clone(&session), allowlist_summary);
        Self {
            credentials,
            url: DEFAULT_GATEWAY_URL.to_string(),
            handler,
            session,
        }
    }

    /// Connects to `url` instead of the public gateway.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn session(&self) -> &Arc<GatewaySession> {
        &self.session
    }

    /// Runs the gateway until `cancel` fires, reconnecting with backoff.
    ///
    /// Stops with [`SnapclaimError::Config`] when the gateway rejects the
    /// session in a way no reconnect can fix, such as a bad token.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), SnapclaimError> {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            info!(url = %self.url, "connecting to gateway");
            let started = tokio::time::Instant::now();

            match gateway::run_connection(&self.url, &self.credentials, &self.handler, &cancel)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "gateway rejected the session, not reconnecting");
                    return Err(SnapclaimError::Config(format!(
                        "discord gateway rejected the session: {e}"
                    )));
                }
                Err(e) => error!(error = %e, "gateway connection lost"),
            }
            if cancel.is_cancelled() {
                break;
            }

            let ran_for = started.elapsed();
            if ran_for >= STABLE_THRESHOLD {
                backoff = INITIAL_BACKOFF;
            }
            warn!(
                backoff_secs = backoff.as_secs(),
                ran_for_secs = ran_for.as_secs(),
                "gateway connection stopped, reconnecting"
            );

            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = cancel.cancelled() => break,
            }
            backoff = next_backoff(backoff);
        }
        info!("gateway shut down");
        Ok(())
    }
}
