// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for snapclaim.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum SnapclaimError {
    /// Configuration errors (missing token, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The gateway task failed outside its own reconnect handling.
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The external click call reported a failure.
    #[error("click error: {message}")]
    Click {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SnapclaimError {
    /// Shorthand for a click failure without an underlying source.
    pub fn click(message: impl Into<String>) -> Self {
        Self::Click {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a gateway failure wrapping its cause.
    pub fn gateway<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Gateway {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
