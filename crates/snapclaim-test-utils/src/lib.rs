// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for snapclaim integration tests.
//!
//! Provides a scriptable click adapter and message snapshot builders for
//! fast, deterministic tests without a live gateway connection.
//!
//! # Components
//!
//! - [`MockClickAdapter`] - Click adapter with scripted outcomes and call capture
//! - [`SnapshotBuilder`] - Fluent builder for [`MessageSnapshot`](snapclaim_core::MessageSnapshot)

pub mod mock_click;
pub mod snapshot;

pub use mock_click::{ClickCall, MockClickAdapter, MockOutcome};
pub use snapshot::{SnapshotBuilder, button, disabled_button, link_button};
