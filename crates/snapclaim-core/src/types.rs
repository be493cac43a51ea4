// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message data model shared by the event source, the dispatch pipeline,
//! and the click adapters.
//!
//! Snapshots are immutable once captured. The pipeline holds them behind an
//! `Arc` for the duration of one dispatch and never copies them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of one message across all of its edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which inbound event kind produced a dispatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum EventSource {
    /// A newly created message.
    #[strum(serialize = "message")]
    #[serde(rename = "message")]
    Created,
    /// An edit of an existing message.
    #[strum(serialize = "edit")]
    #[serde(rename = "edit")]
    Edited,
}

/// Outcome of one click attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ClickResult {
    /// The click action was invoked and reported success.
    Clicked,
    /// No actionable element with an accepted label was found.
    NoMatch,
    /// The identity had already been claimed by another path.
    Skipped,
    /// The click action was invoked and reported failure.
    Failed,
}

/// A single interactive element (button, select menu, ...) on a message.
///
/// Every field is optional or defaulted; absent values read as their neutral
/// default (empty label, no action id, not a link, enabled).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveElement {
    #[serde(default)]
    pub label: Option<String>,
    /// Opaque action identifier, present only on actionable elements.
    #[serde(default)]
    pub custom_id: Option<String>,
    /// Target URL of a link element.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl InteractiveElement {
    /// The raw label, or `""` when absent.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// The label trimmed and lowercased, as used for matching.
    pub fn normalized_label(&self) -> String {
        normalize_label(self.label())
    }

    /// Whether this element navigates to a URL instead of triggering an action.
    pub fn is_link(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// The action identifier, if present and non-empty.
    pub fn action_id(&self) -> Option<&str> {
        self.custom_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Enabled, not a link, and carrying an action identifier.
    pub fn is_actionable(&self) -> bool {
        !self.disabled && !self.is_link() && self.action_id().is_some()
    }
}

/// One row of interactive elements, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRow {
    #[serde(default)]
    pub elements: Vec<InteractiveElement>,
}

impl ElementRow {
    pub fn new(elements: Vec<InteractiveElement>) -> Self {
        Self { elements }
    }
}

/// Immutable capture of a message as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub guild_id: Option<u64>,
    pub channel_id: Option<u64>,
    /// Author of the message, when the event source knows it.
    pub author_id: Option<u64>,
    /// Application that owns the message's components, if any.
    pub application_id: Option<u64>,
    /// Set when this process's own identity authored the message.
    pub authored_by_self: bool,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub rows: Vec<ElementRow>,
}

impl MessageSnapshot {
    /// Whether at least one row carries at least one element.
    pub fn has_interactive_elements(&self) -> bool {
        self.rows.iter().any(|row| !row.elements.is_empty())
    }

    /// All elements in row-major order.
    pub fn elements(&self) -> impl Iterator<Item = &InteractiveElement> {
        self.rows.iter().flat_map(|row| row.elements.iter())
    }

    /// Milliseconds between message creation and `now`.
    pub fn created_age_ms(&self, now: DateTime<Utc>) -> f64 {
        millis_between(self.created_at, now)
    }

    /// Milliseconds between the last edit and `now`, if the message was edited.
    pub fn edited_age_ms(&self, now: DateTime<Utc>) -> Option<f64> {
        self.edited_at.map(|at| millis_between(at, now))
    }
}

/// Trim and lowercase a label for case-insensitive matching.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

fn millis_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from)
        .num_microseconds()
        .map(|us| us as f64 / 1000.0)
        .unwrap_or_else(|| (to - from).num_milliseconds() as f64)
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
