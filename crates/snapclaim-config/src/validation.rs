// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as a usable token, non-zero capacities, and a parseable listen address.
//! Values that are merely out of range (worker count, TTL) are clamped when
//! settings are resolved, not rejected here.

use std::net::SocketAddr;

use crate::diagnostic::ConfigError;
use crate::model::{SnapclaimConfig, PLACEHOLDER_TOKEN};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SnapclaimConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match config.discord.token.as_deref().map(str::trim) {
        None | Some("") => errors.push(ConfigError::MissingKey {
            key: "discord.token".to_string(),
        }),
        Some(PLACEHOLDER_TOKEN) => errors.push(ConfigError::Validation {
            message: format!(
                "discord.token is still the `{PLACEHOLDER_TOKEN}` placeholder; set your account token"
            ),
        }),
        Some(_) => {}
    }

    if config.dispatch.queue_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.queue_capacity must be at least 1".to_string(),
        });
    }

    if config.dispatch.stats_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.stats_interval_secs must be at least 1".to_string(),
        });
    }

    if config.dispatch.metrics_window == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.metrics_window must be at least 1".to_string(),
        });
    }

    if !config.claim.on_message && !config.claim.on_edit {
        errors.push(ConfigError::Validation {
            message: "claim.on_message and claim.on_edit are both false; nothing would ever be claimed"
                .to_string(),
        });
    }

    if config.prometheus.enabled {
        let addr = config.prometheus.listen_address.trim();
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "prometheus.listen_address `{addr}` is not a valid socket address (host:port)"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SnapclaimConfig {
        let mut config = SnapclaimConfig::default();
        config.discord.token = Some("abc.def.ghi".to_string());
        config
    }

    #[test]
    fn config_with_token_validates() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn default_config_is_missing_token() {
        let errors = validate_config(&SnapclaimConfig::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "discord.token")));
    }

    #[test]
    fn blank_token_is_missing() {
        let mut config = valid_config();
        config.discord.token = Some("   ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(&errors[0], ConfigError::MissingKey { .. }));
    }

    #[test]
    fn placeholder_token_fails_validation() {
        let mut config = valid_config();
        config.discord.token = Some(PLACEHOLDER_TOKEN.to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("placeholder"))));
    }

    #[test]
    fn zero_capacities_fail_validation() {
        let mut config = valid_config();
        config.dispatch.queue_capacity = 0;
        config.dispatch.metrics_window = 0;
        config.dispatch.stats_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn out_of_range_workers_are_not_rejected() {
        let mut config = valid_config();
        config.dispatch.workers = 64;
        config.dispatch.dedup_ttl_secs = 1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn both_sources_disabled_fails_validation() {
        let mut config = valid_config();
        config.claim.on_message = false;
        config.claim.on_edit = false;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("on_edit"))));
    }

    #[test]
    fn bad_listen_address_only_checked_when_enabled() {
        let mut config = valid_config();
        config.prometheus.listen_address = "not an address".to_string();
        assert!(validate_config(&config).is_ok());

        config.prometheus.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("listen_address"))));
    }
}
