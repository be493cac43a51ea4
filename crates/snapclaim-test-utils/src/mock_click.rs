// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock click adapter for deterministic testing.
//!
//! `MockClickAdapter` implements `ClickAdapter` with scripted outcomes and
//! captures every activation for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use snapclaim_core::traits::adapter::PluginAdapter;
use snapclaim_core::traits::click::ClickAdapter;
use snapclaim_core::types::{HealthStatus, InteractiveElement, MessageId, MessageSnapshot};
use snapclaim_core::SnapclaimError;

/// What the next activation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    Succeed,
    /// Return a click error with this message.
    Fail(String),
    /// Panic inside `activate`.
    Panic,
}

/// One captured activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickCall {
    pub message_id: MessageId,
    pub label: String,
    pub custom_id: Option<String>,
}

/// A mock click adapter for testing.
///
/// Outcomes are consumed in order from the script; once it runs dry every
/// activation succeeds. An optional delay simulates network latency.
pub struct MockClickAdapter {
    calls: Arc<Mutex<Vec<ClickCall>>>,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    delay: Option<Duration>,
    notify: Arc<Notify>,
    health: Arc<Mutex<HealthStatus>>,
    shut_down: Arc<AtomicBool>,
}

impl MockClickAdapter {
    /// Create a mock whose activations always succeed immediately.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            delay: None,
            notify: Arc::new(Notify::new()),
            health: Arc::new(Mutex::new(HealthStatus::Healthy)),
            shut_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock that plays `outcomes` in order before succeeding.
    pub fn with_script(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        Self {
            script: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            ..Self::new()
        }
    }

    /// Sleep for `delay` inside every activation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append an outcome to the script.
    pub async fn push_outcome(&self, outcome: MockOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Status returned by every later health check.
    pub async fn set_health(&self, status: HealthStatus) {
        *self.health.lock().await = status;
    }

    /// Whether `shutdown` was called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Get every activation recorded so far.
    pub async fn calls(&self) -> Vec<ClickCall> {
        self.calls.lock().await.clone()
    }

    /// Get the count of activations.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Wait until at least `count` activations were recorded.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if self.call_count().await >= count {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.call_count().await >= count;
            }
        }
    }
}

impl Default for MockClickAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockClickAdapter {
    fn name(&self) -> &str {
        "mock-click"
    }

    async fn health_check(&self) -> Result<HealthStatus, SnapclaimError> {
        Ok(self.health.lock().await.clone())
    }

    async fn shutdown(&self) -> Result<(), SnapclaimError> {
        self.shut_down.store(true, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl ClickAdapter for MockClickAdapter {
    async fn activate(
        &self,
        snapshot: &MessageSnapshot,
        element: &InteractiveElement,
    ) -> Result<(), SnapclaimError> {
        self.calls.lock().await.push(ClickCall {
            message_id: snapshot.id,
            label: element.label().to_string(),
            custom_id: element.custom_id.clone(),
        });
        self.notify.notify_waiters();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(MockOutcome::Succeed);
        match outcome {
            MockOutcome::Succeed => Ok(()),
            MockOutcome::Fail(message) => Err(SnapclaimError::click(message)),
            MockOutcome::Panic => panic!("mock click adapter scripted panic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotBuilder, button};

    #[tokio::test]
    async fn records_calls_and_succeeds_by_default() {
        let clicker = MockClickAdapter::new();
        let snapshot = SnapshotBuilder::new(42).row([button("Claim Gift", "abc")]).build();
        let element = snapshot.elements().next().unwrap().clone();

        clicker.activate(&snapshot, &element).await.unwrap();

        let calls = clicker.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message_id, MessageId(42));
        assert_eq!(calls[0].label, "Claim Gift");
        assert_eq!(calls[0].custom_id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn script_plays_in_order() {
        let clicker = MockClickAdapter::with_script([MockOutcome::Fail("status 400".into())]);
        let snapshot = SnapshotBuilder::new(1).row([button("a", "x")]).build();
        let element = snapshot.elements().next().unwrap().clone();

        let err = clicker.activate(&snapshot, &element).await.unwrap_err();
        assert!(err.to_string().contains("status 400"));
        assert!(clicker.activate(&snapshot, &element).await.is_ok());
        assert_eq!(clicker.call_count().await, 2);
    }

    #[tokio::test]
    async fn wait_for_calls_times_out() {
        let clicker = MockClickAdapter::new();
        assert!(!clicker.wait_for_calls(1, Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn wait_for_calls_wakes_on_activation() {
        let clicker = Arc::new(MockClickAdapter::new());
        let background = Arc::clone(&clicker);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let snapshot = SnapshotBuilder::new(3).row([button("a", "x")]).build();
            let element = snapshot.elements().next().unwrap().clone();
            background.activate(&snapshot, &element).await.unwrap();
        });

        assert!(clicker.wait_for_calls(1, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn health_and_shutdown_are_scriptable() {
        let clicker = MockClickAdapter::new();
        assert_eq!(clicker.health_check().await.unwrap(), HealthStatus::Healthy);

        clicker.set_health(HealthStatus::Degraded("no session".into())).await;
        assert_eq!(
            clicker.health_check().await.unwrap(),
            HealthStatus::Degraded("no session".into())
        );

        assert!(!clicker.is_shut_down());
        clicker.shutdown().await.unwrap();
        assert!(clicker.is_shut_down());
    }
}
