// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for snapclaim.
//!
//! This crate provides the error type, the message data model, and the
//! adapter traits used throughout the workspace. The gateway and click
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SnapclaimError;
pub use types::{
    ClickResult, ElementRow, EventSource, HealthStatus, InteractiveElement, MessageId,
    MessageSnapshot, normalize_label,
};

pub use traits::{ClickAdapter, PluginAdapter};
