// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway session identity shared between the event handler and the
//! interaction client.
//!
//! Written on every `READY`, read on every click. Readers never block.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;

/// Identity of the current gateway session.
#[derive(Debug, Default)]
pub struct GatewaySession {
    session_id: ArcSwapOption<String>,
    /// Own user id; 0 until the first `READY`.
    user_id: AtomicU64,
}

impl GatewaySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the identity announced by a `READY` event.
    pub fn record_ready(&self, session_id: &str, user_id: u64) {
        self.session_id.store(Some(Arc::new(session_id.to_string())));
        self.user_id.store(user_id, Ordering::Release);
    }

    /// The gateway session id, if connected at least once.
    pub fn session_id(&self) -> Option<Arc<String>> {
        self.session_id.load_full()
    }

    /// Own user id, if connected at least once.
    pub fn user_id(&self) -> Option<u64> {
        match self.user_id.load(Ordering::Acquire) {
            0 => None,
            id => Some(id),
        }
    }

    /// Whether `author_id` is this session's own account.
    pub fn is_self(&self, author_id: u64) -> bool {
        self.user_id() == Some(author_id)
    }
}
