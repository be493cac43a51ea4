// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Button activation over the Discord HTTP API.
//!
//! A click is a single `POST /interactions` of a component interaction on
//! behalf of the current gateway session, authenticated with the same
//! [`Credentials`] the gateway identified with. No retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use snapclaim_core::traits::adapter::PluginAdapter;
use snapclaim_core::traits::click::ClickAdapter;
use snapclaim_core::types::{HealthStatus, InteractiveElement, MessageSnapshot};
use snapclaim_core::SnapclaimError;
use tracing::debug;

use crate::credentials::Credentials;
use crate::session::GatewaySession;

/// Default REST base.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const INTERACTION_TYPE_COMPONENT: u8 = 3;
const COMPONENT_TYPE_BUTTON: u8 = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct InteractionPayload<'a> {
    #[serde(rename = "type")]
    kind: u8,
    nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    guild_id: Option<String>,
    channel_id: String,
    message_flags: u64,
    message_id: String,
    application_id: String,
    session_id: &'a str,
    data: InteractionData<'a>,
}

#[derive(Debug, Serialize)]
struct InteractionData<'a> {
    component_type: u8,
    custom_id: &'a str,
}

/// Snowflake-shaped nonce for the current instant.
fn nonce() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    (millis.saturating_sub(1_420_070_400_000) << 22).to_string()
}

/// [`ClickAdapter`] posting component interactions.
pub struct InteractionClicker {
    http: reqwest::Client,
    api_base: String,
    credentials: Credentials,
    session: Arc<GatewaySession>,
}

impl InteractionClicker {
    /// Creates a clicker against [`DEFAULT_API_BASE`].
    pub fn new(
        credentials: Credentials,
        session: Arc<GatewaySession>,
    ) -> Result<Self, SnapclaimError> {
        Self::with_api_base(credentials, session, DEFAULT_API_BASE)
    }

    /// Creates a clicker against an arbitrary REST base.
    pub fn with_api_base(
        credentials: Credentials,
        session: Arc<GatewaySession>,
        api_base: &str,
    ) -> Result<Self, SnapclaimError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SnapclaimError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
            session,
        })
    }

    fn interactions_url(&self) -> String {
        format!("{}/interactions", self.api_base)
    }
}

#[async_trait]
impl PluginAdapter for InteractionClicker {
    fn name(&self) -> &str {
        "discord-interactions"
    }

    async fn health_check(&self) -> Result<HealthStatus, SnapclaimError> {
        if self.session.session_id().is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("no gateway session yet".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), SnapclaimError> {
        Ok(())
    }
}

#[async_trait]
impl ClickAdapter for InteractionClicker {
    async fn activate(
        &self,
        snapshot: &MessageSnapshot,
        element: &InteractiveElement,
    ) -> Result<(), SnapclaimError> {
        let custom_id = element
            .action_id()
            .ok_or_else(|| SnapclaimError::click("element has no custom id"))?;
        let channel_id = snapshot
            .channel_id
            .ok_or_else(|| SnapclaimError::click("message has no channel"))?;
        let application_id = snapshot
            .application_id
            .or(snapshot.author_id)
            .ok_or_else(|| SnapclaimError::click("message has no application or author"))?;
        let session_id = self
            .session
            .session_id()
            .ok_or_else(|| SnapclaimError::click("gateway session not established"))?;

        let payload = InteractionPayload {
            kind: INTERACTION_TYPE_COMPONENT,
            nonce: nonce(),
            guild_id: snapshot.guild_id.map(|id| id.to_string()),
            channel_id: channel_id.to_string(),
            message_flags: 0,
            message_id: snapshot.id.to_string(),
            application_id: application_id.to_string(),
            session_id: session_id.as_str(),
            data: InteractionData {
                component_type: COMPONENT_TYPE_BUTTON,
                custom_id,
            },
        };

        let response = self
            .http
            .post(self.interactions_url())
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SnapclaimError::Click {
                message: "interaction request failed".into(),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(message_id = %snapshot.id, custom_id, %status, "interaction accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SnapclaimError::click(format!(
            "interaction rejected with status {status}: {body}"
        )))
    }
}
