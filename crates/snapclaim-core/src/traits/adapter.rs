// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all adapters must implement.

use async_trait::async_trait;

use crate::error::SnapclaimError;
use crate::types::HealthStatus;

/// Identity, health and lifecycle shared by every snapclaim adapter.
///
/// The dispatch pipeline polls [`health_check`](PluginAdapter::health_check)
/// with every stats line and calls [`shutdown`](PluginAdapter::shutdown)
/// once its workers have stopped.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, SnapclaimError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), SnapclaimError>;
}
