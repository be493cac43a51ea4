// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Click adapter trait: the external action behind an interactive element.

use async_trait::async_trait;

use crate::error::SnapclaimError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InteractiveElement, MessageSnapshot};

/// Performs the platform call that activates one interactive element.
///
/// The dispatch pipeline calls [`activate`](ClickAdapter::activate) at most
/// once per claimed message identity and never retries a failure, so
/// implementations must not retry internally either.
#[async_trait]
pub trait ClickAdapter: PluginAdapter {
    /// Activates `element` on the message captured by `snapshot`.
    async fn activate(
        &self,
        snapshot: &MessageSnapshot,
        element: &InteractiveElement,
    ) -> Result<(), SnapclaimError>;
}
