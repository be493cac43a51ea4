// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway event routing and message snapshot conversion.
//!
//! Dispatches are decoded into [`model`](crate::model) types, converted into
//! [`MessageSnapshot`]s and routed to the dispatch pipeline's ingestion
//! handler. Nothing here performs I/O.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use snapclaim_core::types::{ElementRow, InteractiveElement, MessageId, MessageSnapshot};
use snapclaim_dispatch::IngestionHandler;
use tracing::{debug, info, warn};

use crate::model::{Component, Message, Ready, COMPONENT_ACTION_ROW, COMPONENT_BUTTON};
use crate::session::GatewaySession;

/// Milliseconds between the Unix epoch and the first second of 2015.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Creation time encoded in a snowflake id.
pub fn snowflake_time(id: u64) -> DateTime<Utc> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Maps one component to an interactive element.
///
/// Link buttons carry their URL and other buttons their custom id. Other
/// component kinds become unlabeled, non-actionable elements.
pub fn element_from_component(component: &Component) -> InteractiveElement {
    if component.kind != COMPONENT_BUTTON {
        return InteractiveElement::default();
    }
    let (custom_id, url) = match &component.url {
        Some(url) => (None, Some(url.clone())),
        None => (component.custom_id.clone(), None),
    };
    InteractiveElement {
        label: component.label.clone(),
        custom_id,
        url,
        disabled: component.disabled,
    }
}

/// Maps top-level components to element rows, preserving order.
///
/// A component outside an action row forms a row of its own.
pub fn rows_from_components(components: &[Component]) -> Vec<ElementRow> {
    components
        .iter()
        .map(|component| {
            if component.kind == COMPONENT_ACTION_ROW {
                ElementRow::new(component.components.iter().map(element_from_component).collect())
            } else {
                ElementRow::new(vec![element_from_component(component)])
            }
        })
        .collect()
}

/// Captures a message. `None` for an update that did not carry components.
pub fn snapshot_from_message(msg: &Message, session: &GatewaySession) -> Option<MessageSnapshot> {
    let components = msg.components.as_deref()?;
    let author_id = msg.author.as_ref().map(|user| user.id);
    Some(MessageSnapshot {
        id: MessageId(msg.id),
        guild_id: msg.guild_id,
        channel_id: Some(msg.channel_id),
        author_id,
        application_id: msg.application_id,
        authored_by_self: author_id.is_some_and(|id| session.is_self(id)),
        created_at: snowflake_time(msg.id),
        edited_at: msg.edited_timestamp,
        rows: rows_from_components(components),
    })
}

/// Routes gateway events into the dispatch pipeline.
pub struct ClaimHandler {
    ingest: IngestionHandler,
    session: Arc<GatewaySession>,
    /// Rendered allowlists, logged on every `READY`.
    allowlist_summary: String,
}

impl ClaimHandler {
    pub fn new(
        ingest: IngestionHandler,
        session: Arc<GatewaySession>,
        allowlist_summary: String,
    ) -> Self {
        Self {
            ingest,
            session,
            allowlist_summary,
        }
    }

    /// Decodes one dispatch by name. Undecodable events are logged and dropped.
    pub fn dispatch(&self, event: &str, data: serde_json::Value) {
        let decoded = match event {
            "READY" => serde_json::from_value::<Ready>(data).map(|ready| self.on_ready(ready)),
            "MESSAGE_CREATE" => {
                serde_json::from_value::<Message>(data).map(|msg| self.on_message(msg))
            }
            "MESSAGE_UPDATE" => {
                serde_json::from_value::<Message>(data).map(|msg| self.on_message_update(msg))
            }
            _ => Ok(()),
        };
        if let Err(e) = decoded {
            warn!(event, error = %e, "failed to decode gateway event");
        }
    }

    fn on_ready(&self, ready: Ready) {
        self.session.record_ready(&ready.session_id, ready.user.id);
        info!(
            user = %ready.user.username,
            user_id = ready.user.id,
            allowlists = %self.allowlist_summary,
            "gateway ready"
        );
    }

    fn on_message(&self, msg: Message) {
        let Some(snapshot) = snapshot_from_message(&msg, &self.session) else {
            debug!(message_id = msg.id, "message without components field, ignoring");
            return;
        };
        let outcome = self.ingest.on_message_created(Arc::new(snapshot));
        debug!(message_id = msg.id, ?outcome, "message event handled");
    }

    /// No message cache is kept, so the previous state is never known.
    fn on_message_update(&self, msg: Message) {
        let Some(current) = snapshot_from_message(&msg, &self.session) else {
            debug!(message_id = msg.id, "edit without components, ignoring");
            return;
        };
        let outcome = self.ingest.on_message_edited(None, Arc::new(current));
        debug!(message_id = msg.id, ?outcome, "edit event handled");
    }
}
