// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cheap admission predicates applied before any task is queued.

use std::collections::HashSet;
use std::fmt;

use snapclaim_core::MessageSnapshot;

use crate::settings::PipelineSettings;

/// Why a snapshot was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    SelfAuthored,
    GuildNotAllowed,
    ChannelNotAllowed,
    NoInteractiveElements,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rejection::SelfAuthored => "self-authored",
            Rejection::GuildNotAllowed => "guild not allowed",
            Rejection::ChannelNotAllowed => "channel not allowed",
            Rejection::NoInteractiveElements => "no interactive elements",
        })
    }
}

/// Allowlist and shape checks. Pure; holds only immutable sets.
#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    allowed_guilds: HashSet<u64>,
    allowed_channels: HashSet<u64>,
}

impl AdmissionFilter {
    pub fn new(allowed_guilds: HashSet<u64>, allowed_channels: HashSet<u64>) -> Self {
        Self {
            allowed_guilds,
            allowed_channels,
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(
            settings.allowed_guilds.clone(),
            settings.allowed_channels.clone(),
        )
    }

    /// Runs every check, cheapest first.
    pub fn check(&self, snapshot: &MessageSnapshot) -> Result<(), Rejection> {
        if snapshot.authored_by_self {
            return Err(Rejection::SelfAuthored);
        }
        if !self.guild_allowed(snapshot.guild_id) {
            return Err(Rejection::GuildNotAllowed);
        }
        if !self.channel_allowed(snapshot.channel_id) {
            return Err(Rejection::ChannelNotAllowed);
        }
        if !snapshot.has_interactive_elements() {
            return Err(Rejection::NoInteractiveElements);
        }
        Ok(())
    }

    pub fn is_allowed(&self, snapshot: &MessageSnapshot) -> bool {
        self.check(snapshot).is_ok()
    }

    /// An empty allowlist admits everything, including messages without a guild.
    pub fn guild_allowed(&self, guild_id: Option<u64>) -> bool {
        self.allowed_guilds.is_empty()
            || guild_id.is_some_and(|id| self.allowed_guilds.contains(&id))
    }

    pub fn channel_allowed(&self, channel_id: Option<u64>) -> bool {
        self.allowed_channels.is_empty()
            || channel_id.is_some_and(|id| self.allowed_channels.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use snapclaim_core::{ElementRow, InteractiveElement, MessageId};

    use super::*;

    fn snapshot(guild: Option<u64>, channel: Option<u64>, elements: usize) -> MessageSnapshot {
        let row = ElementRow::new(
            (0..elements)
                .map(|_| InteractiveElement {
                    label: Some("Claim Gift".into()),
                    custom_id: Some("x".into()),
                    ..Default::default()
                })
                .collect(),
        );
        MessageSnapshot {
            id: MessageId(1),
            guild_id: guild,
            channel_id: channel,
            author_id: None,
            application_id: None,
            authored_by_self: false,
            created_at: Utc::now(),
            edited_at: None,
            rows: vec![row],
        }
    }

    #[test]
    fn empty_allowlists_admit_everything() {
        let filter = AdmissionFilter::default();
        assert!(filter.is_allowed(&snapshot(Some(1), Some(2), 1)));
        assert!(filter.is_allowed(&snapshot(None, None, 1)));
    }

    #[test]
    fn no_elements_rejected() {
        let filter = AdmissionFilter::default();
        assert_eq!(
            filter.check(&snapshot(None, None, 0)),
            Err(Rejection::NoInteractiveElements)
        );
    }

    #[test]
    fn self_authored_rejected_first() {
        let filter = AdmissionFilter::new(HashSet::from([5]), HashSet::new());
        let mut own = snapshot(Some(1), None, 0);
        own.authored_by_self = true;
        assert_eq!(filter.check(&own), Err(Rejection::SelfAuthored));
    }

    #[test]
    fn guild_allowlist_requires_guild() {
        let filter = AdmissionFilter::new(HashSet::from([10]), HashSet::new());
        assert!(filter.is_allowed(&snapshot(Some(10), Some(99), 1)));
        assert_eq!(
            filter.check(&snapshot(Some(11), None, 1)),
            Err(Rejection::GuildNotAllowed)
        );
        assert_eq!(
            filter.check(&snapshot(None, None, 1)),
            Err(Rejection::GuildNotAllowed)
        );
    }

    #[test]
    fn channel_allowlist_applies_independently() {
        let filter = AdmissionFilter::new(HashSet::new(), HashSet::from([20]));
        assert!(filter.is_allowed(&snapshot(None, Some(20), 1)));
        assert_eq!(
            filter.check(&snapshot(Some(1), Some(21), 1)),
            Err(Rejection::ChannelNotAllowed)
        );
    }

    proptest! {
        #[test]
        fn outside_nonempty_allowlist_is_rejected(
            allowed in proptest::collection::hash_set(0u64..1_000, 1..10),
            guild in 0u64..1_000,
        ) {
            let filter = AdmissionFilter::new(allowed.clone(), HashSet::new());
            let admitted = filter.is_allowed(&snapshot(Some(guild), None, 1));
            prop_assert_eq!(admitted, allowed.contains(&guild));
        }

        #[test]
        fn zero_elements_never_admitted(guild in proptest::option::of(0u64..100)) {
            prop_assert!(!AdmissionFilter::default().is_allowed(&snapshot(guild, None, 0)));
        }
    }
}
