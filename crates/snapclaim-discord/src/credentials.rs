// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account credentials shared by the gateway and the interaction client.
//!
//! snapclaim runs as a user session: the token is sent unchanged as the
//! `IDENTIFY` token and as the HTTP `Authorization` header.

use std::fmt;
use std::sync::Arc;

use snapclaim_core::SnapclaimError;

/// A validated account token.
#[derive(Clone)]
pub struct Credentials {
    token: Arc<str>,
}

impl Credentials {
    /// Trims the token and rejects an empty one.
    pub fn new(token: &str) -> Result<Self, SnapclaimError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SnapclaimError::Config("discord.token cannot be empty".into()));
        }
        Ok(Self {
            token: Arc::from(token),
        })
    }

    /// The value both transports authenticate with.
    pub fn authorization(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_trimmed_and_kept_unprefixed() {
        let credentials = Credentials::new("  mfa.abc  ").unwrap();
        assert_eq!(credentials.authorization(), "mfa.abc");
    }

    #[test]
    fn blank_token_is_config_error() {
        assert!(matches!(Credentials::new(" \t"), Err(SnapclaimError::Config(_))));
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", Credentials::new("secret").unwrap());
        assert!(!rendered.contains("secret"), "got: {rendered}");
    }
}
