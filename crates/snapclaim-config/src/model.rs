// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for snapclaim.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder token shipped in sample configs; never a real credential.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_DISCORD_TOKEN";

/// Label used when no button label is configured.
pub const DEFAULT_BUTTON_LABEL: &str = "Claim Gift";

/// Top-level snapclaim configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section except `discord.token` has a usable default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SnapclaimConfig {
    /// Process-level settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Gateway credentials.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Which messages and buttons qualify for a claim.
    #[serde(default)]
    pub claim: ClaimConfig,

    /// Queue, worker, and dedup tuning.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Discord gateway configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Account token. Required; `None` fails validation.
    #[serde(default)]
    pub token: Option<String>,
}

/// An identifier as written in the config file.
///
/// Snowflakes are commonly quoted, so both TOML integers and strings are
/// accepted. TOML integers are signed; negative values and strings that do
/// not parse are skipped when settings are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    /// Parses the identifier, returning `None` for negative or malformed values.
    pub fn parse(&self) -> Option<u64> {
        match self {
            RawId::Int(value) => u64::try_from(*value).ok(),
            RawId::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(value) => write!(f, "{value}"),
            RawId::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// Admission rules for claim attempts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimConfig {
    /// Accepted button labels, matched case-insensitively after trimming.
    #[serde(default = "default_button_labels")]
    pub button_labels: Vec<String>,

    /// Legacy single-label setting, merged into `button_labels`.
    #[serde(default)]
    pub button_label: Option<String>,

    /// Guilds to watch. Empty means every guild.
    #[serde(default)]
    pub allowed_guild_ids: Vec<RawId>,

    /// Channels to watch. Empty means every channel.
    #[serde(default)]
    pub allowed_channel_ids: Vec<RawId>,

    /// React to newly created messages.
    #[serde(default = "default_true")]
    pub on_message: bool,

    /// React to edited messages.
    #[serde(default = "default_true")]
    pub on_edit: bool,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            button_labels: default_button_labels(),
            button_label: None,
            allowed_guild_ids: Vec::new(),
            allowed_channel_ids: Vec::new(),
            on_message: true,
            on_edit: true,
        }
    }
}

fn default_button_labels() -> Vec<String> {
    vec![DEFAULT_BUTTON_LABEL.to_string()]
}

fn default_true() -> bool {
    true
}

/// Queue, worker pool, and dedup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Number of concurrent click workers (clamped into 1..=8).
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bounded work queue capacity. Events beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// How long a claimed message identity is remembered (floor 30s).
    #[serde(default = "default_dedup_ttl_secs")]
    pub dedup_ttl_secs: u64,

    /// Interval between stats summary lines.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,

    /// Samples retained per latency window.
    #[serde(default = "default_metrics_window")]
    pub metrics_window: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            dedup_ttl_secs: default_dedup_ttl_secs(),
            stats_interval_secs: default_stats_interval_secs(),
            metrics_window: default_metrics_window(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_dedup_ttl_secs() -> u64 {
    600
}

fn default_stats_interval_secs() -> u64 {
    30
}

fn default_metrics_window() -> usize {
    512
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Whether to serve metrics over HTTP.
    #[serde(default)]
    pub enabled: bool,

    /// Socket address of the scrape endpoint.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1:9464".to_string()
}
