// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for message snapshots and their elements.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use snapclaim_core::types::{ElementRow, InteractiveElement, MessageId, MessageSnapshot};

/// An enabled button with an action identifier.
pub fn button(label: &str, custom_id: &str) -> InteractiveElement {
    InteractiveElement {
        label: Some(label.to_string()),
        custom_id: Some(custom_id.to_string()),
        url: None,
        disabled: false,
    }
}

/// A disabled button with an action identifier.
pub fn disabled_button(label: &str, custom_id: &str) -> InteractiveElement {
    InteractiveElement {
        disabled: true,
        ..button(label, custom_id)
    }
}

/// A link button: a URL and no action identifier.
pub fn link_button(label: &str, url: &str) -> InteractiveElement {
    InteractiveElement {
        label: Some(label.to_string()),
        custom_id: None,
        url: Some(url.to_string()),
        disabled: false,
    }
}

/// Fluent builder for [`MessageSnapshot`].
///
/// Defaults to a message created now, outside any guild or channel, with no
/// rows and not authored by this process.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snapshot: MessageSnapshot,
}

impl SnapshotBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            snapshot: MessageSnapshot {
                id: MessageId(id),
                guild_id: None,
                channel_id: None,
                author_id: None,
                application_id: None,
                authored_by_self: false,
                created_at: Utc::now(),
                edited_at: None,
                rows: Vec::new(),
            },
        }
    }

    pub fn guild(mut self, guild_id: u64) -> Self {
        self.snapshot.guild_id = Some(guild_id);
        self
    }

    pub fn channel(mut self, channel_id: u64) -> Self {
        self.snapshot.channel_id = Some(channel_id);
        self
    }

    pub fn author(mut self, author_id: u64) -> Self {
        self.snapshot.author_id = Some(author_id);
        self
    }

    pub fn application(mut self, application_id: u64) -> Self {
        self.snapshot.application_id = Some(application_id);
        self
    }

    /// Marks the message as authored by this process.
    pub fn from_self(mut self) -> Self {
        self.snapshot.authored_by_self = true;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.snapshot.created_at = at;
        self
    }

    pub fn edited_at(mut self, at: DateTime<Utc>) -> Self {
        self.snapshot.edited_at = Some(at);
        self
    }

    /// Appends a row of elements.
    pub fn row(mut self, elements: impl IntoIterator<Item = InteractiveElement>) -> Self {
        self.snapshot
            .rows
            .push(ElementRow::new(elements.into_iter().collect()));
        self
    }

    pub fn build(self) -> MessageSnapshot {
        self.snapshot
    }

    pub fn build_arc(self) -> Arc<MessageSnapshot> {
        Arc::new(self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let snapshot = SnapshotBuilder::new(7)
            .guild(1)
            .channel(2)
            .author(3)
            .from_self()
            .row([button("A", "a"), link_button("B", "http://x")])
            .row([disabled_button("C", "c")])
            .build();

        assert_eq!(snapshot.id, MessageId(7));
        assert_eq!(snapshot.guild_id, Some(1));
        assert_eq!(snapshot.channel_id, Some(2));
        assert_eq!(snapshot.author_id, Some(3));
        assert!(snapshot.authored_by_self);
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.elements().filter(|e| e.is_actionable()).count(), 1);
    }
}
