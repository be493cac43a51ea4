// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./snapclaim.toml` > `~/.config/snapclaim/snapclaim.toml` > `/etc/snapclaim/snapclaim.toml`
//! with environment variable overrides via `SNAPCLAIM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SnapclaimConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/snapclaim/snapclaim.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "snapclaim.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/snapclaim/snapclaim.toml` (system-wide)
/// 3. `~/.config/snapclaim/snapclaim.toml` (user XDG config)
/// 4. `./snapclaim.toml` (local directory)
/// 5. `SNAPCLAIM_*` environment variables
pub fn load_config() -> Result<SnapclaimConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<SnapclaimConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SnapclaimConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SnapclaimConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SnapclaimConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SnapclaimConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/snapclaim/snapclaim.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("snapclaim").join(LOCAL_CONFIG_FILE))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SNAPCLAIM_CLAIM_ALLOWED_GUILD_IDS` must map to
/// `claim.allowed_guild_ids`, not `claim.allowed.guild.ids`.
fn env_provider() -> Env {
    Env::prefixed("SNAPCLAIM_").map(|key| map_env_key(key.as_str()).into())
}

/// Rewrite a lowercased, prefix-stripped env var name into a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 5] = ["daemon", "discord", "claim", "dispatch", "prometheus"];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
