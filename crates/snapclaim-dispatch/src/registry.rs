// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL-bounded registry of claimed message identities.
//!
//! Every access (claim, peek, evict) goes through one synchronous mutex that
//! is never held across an await point. The claim is a single
//! check-and-insert under that lock, so concurrent claimers of the same
//! identity observe exactly one winner.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use snapclaim_core::MessageId;
use tokio::time::Instant;

/// Identities claimed within the TTL window, mapped to their claim instant.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    entries: Mutex<HashMap<MessageId, Instant>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` at the current instant.
    ///
    /// Returns `true` when the identity was absent and is now claimed,
    /// `false` when another path already holds it.
    pub fn try_claim(&self, id: MessageId) -> bool {
        self.try_claim_at(id, Instant::now())
    }

    /// Claims `id` as of `now`.
    pub fn try_claim_at(&self, id: MessageId, now: Instant) -> bool {
        match self.lock().entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    /// Whether `id` is currently claimed. Does not claim.
    pub fn contains(&self, id: MessageId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every entry claimed more than `ttl` before `now`.
    ///
    /// Returns the number of evicted entries.
    pub fn evict_expired(&self, now: Instant, ttl: Duration) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, claimed_at| now.saturating_duration_since(*claimed_at) <= ttl);
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MessageId, Instant>> {
        // The map stays consistent even if a holder panicked mid-call.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
