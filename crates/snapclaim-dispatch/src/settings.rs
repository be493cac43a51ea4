// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of the loaded configuration into immutable pipeline settings.
//!
//! Normalizes labels, parses identifier allowlists, and clamps tuning values
//! into their supported ranges. The result is built once before the pipeline
//! starts and never changes afterwards.

use std::collections::HashSet;
use std::time::Duration;

use snapclaim_config::model::{RawId, SnapclaimConfig, DEFAULT_BUTTON_LABEL};
use snapclaim_core::normalize_label;
use tracing::warn;

/// Smallest worker pool.
pub const MIN_WORKERS: usize = 1;
/// Largest worker pool.
pub const MAX_WORKERS: usize = 8;
/// Shortest time a claimed identity is remembered.
pub const MIN_DEDUP_TTL: Duration = Duration::from_secs(30);
/// Shortest interval between dedup sweeps.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(10);

/// Effective, immutable settings for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Accepted labels, trimmed and lowercased.
    pub accepted_labels: HashSet<String>,
    /// Accepted labels as configured, in configuration order, for logging.
    pub display_labels: Vec<String>,
    /// Guild allowlist. Empty admits every guild.
    pub allowed_guilds: HashSet<u64>,
    /// Channel allowlist. Empty admits every channel.
    pub allowed_channels: HashSet<u64>,
    /// Whether "new message" events are processed.
    pub on_message: bool,
    /// Whether "message edited" events are processed.
    pub on_edit: bool,
    pub workers: usize,
    pub queue_capacity: usize,
    pub dedup_ttl: Duration,
    pub stats_interval: Duration,
    pub metrics_window: usize,
}

impl PipelineSettings {
    /// Resolves settings from a loaded configuration.
    ///
    /// Malformed allowlist entries are skipped with a warning rather than
    /// rejected, so one bad id never blocks startup.
    pub fn from_config(config: &SnapclaimConfig) -> Self {
        let display_labels = resolve_labels(
            &config.claim.button_labels,
            config.claim.button_label.as_deref(),
        );
        let accepted_labels = display_labels.iter().map(|l| normalize_label(l)).collect();
        let dispatch = &config.dispatch;

        Self {
            accepted_labels,
            display_labels,
            allowed_guilds: parse_id_list("claim.allowed_guild_ids", &config.claim.allowed_guild_ids),
            allowed_channels: parse_id_list(
                "claim.allowed_channel_ids",
                &config.claim.allowed_channel_ids,
            ),
            on_message: config.claim.on_message,
            on_edit: config.claim.on_edit,
            workers: dispatch.workers.clamp(MIN_WORKERS, MAX_WORKERS),
            queue_capacity: dispatch.queue_capacity.max(1),
            dedup_ttl: Duration::from_secs(dispatch.dedup_ttl_secs).max(MIN_DEDUP_TTL),
            stats_interval: Duration::from_secs(dispatch.stats_interval_secs.max(1)),
            metrics_window: dispatch.metrics_window.max(1),
        }
    }

    /// Interval of the dedup sweep: a quarter of the TTL, never under 10s.
    pub fn cleanup_interval(&self) -> Duration {
        (self.dedup_ttl / 4).max(MIN_CLEANUP_INTERVAL)
    }

    /// Replaces the accepted labels, keeping normalization consistent.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.display_labels = resolve_labels(&labels, None);
        self.accepted_labels = self.display_labels.iter().map(|l| normalize_label(l)).collect();
        self
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&SnapclaimConfig::default())
    }
}

/// Merges configured labels and the legacy single label.
///
/// Labels are trimmed, empties dropped, and case-insensitive duplicates
/// collapsed (first spelling wins). Falls back to the default label when
/// nothing usable remains.
pub fn resolve_labels(labels: &[String], legacy: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for raw in labels.iter().map(String::as_str).chain(legacy) {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        if seen.insert(normalize_label(text)) {
            resolved.push(text.to_string());
        }
    }

    if resolved.is_empty() {
        resolved.push(DEFAULT_BUTTON_LABEL.to_string());
    }
    resolved
}

/// Parses an allowlist, skipping entries that are not valid identifiers.
pub fn parse_id_list(field: &str, values: &[RawId]) -> HashSet<u64> {
    let mut parsed = HashSet::with_capacity(values.len());
    for value in values {
        match value.parse() {
            Some(id) => {
                parsed.insert(id);
            }
            None => warn!(field, value = %value, "skipping invalid id value in config"),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn defaults_resolve_to_claim_gift() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.display_labels, vec!["Claim Gift"]);
        assert!(settings.accepted_labels.contains("claim gift"));
        assert!(settings.allowed_guilds.is_empty());
        assert!(settings.allowed_channels.is_empty());
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.queue_capacity, 1000);
        assert_eq!(settings.dedup_ttl, Duration::from_secs(600));
        assert_eq!(settings.cleanup_interval(), Duration::from_secs(150));
    }

    #[test]
    fn labels_merge_legacy_and_drop_blanks() {
        let labels = vec!["  Claim Gift ".to_string(), "".to_string(), "claim gift".to_string()];
        let resolved = resolve_labels(&labels, Some(" Open "));
        assert_eq!(resolved, vec!["Claim Gift", "Open"]);
    }

    #[test]
    fn labels_fall_back_to_default() {
        assert_eq!(resolve_labels(&["   ".to_string()], Some("")), vec!["Claim Gift"]);
        assert_eq!(resolve_labels(&[], None), vec!["Claim Gift"]);
    }

    #[test]
    fn id_list_skips_invalid_entries() {
        let ids = parse_id_list(
            "claim.allowed_guild_ids",
            &[RawId::Int(1), RawId::Text("2".into()), RawId::Text("x".into())],
        );
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[test]
    #[traced_test]
    fn negative_ids_load_and_are_skipped() {
        let config = snapclaim_config::load_config_from_str(
            "[claim]\nallowed_guild_ids = [-1, 5]\n",
        )
        .unwrap();
        let settings = PipelineSettings::from_config(&config);
        assert_eq!(settings.allowed_guilds, HashSet::from([5]));
        assert!(logs_contain("skipping invalid id value in config"));
    }

    #[test]
    fn tuning_values_are_clamped() {
        let mut config = SnapclaimConfig::default();
        config.dispatch.workers = 0;
        config.dispatch.dedup_ttl_secs = 5;
        let settings = PipelineSettings::from_config(&config);
        assert_eq!(settings.workers, MIN_WORKERS);
        assert_eq!(settings.dedup_ttl, MIN_DEDUP_TTL);
        assert_eq!(settings.cleanup_interval(), MIN_CLEANUP_INTERVAL);

        config.dispatch.workers = 100;
        let settings = PipelineSettings::from_config(&config);
        assert_eq!(settings.workers, MAX_WORKERS);
    }

    #[test]
    fn with_labels_renormalizes() {
        let settings = PipelineSettings::default().with_labels(["Open Box", "GRAB"]);
        assert_eq!(
            settings.accepted_labels,
            HashSet::from(["open box".to_string(), "grab".to_string()])
        );
    }
}
