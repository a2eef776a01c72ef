// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing keys: a logical key plus an instance id.

use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one instantiation of a logical key.
///
/// Two routing keys are equal only if both the logical key and the instance id
/// match, so pushing, popping, and pushing the same key again produces a fresh
/// identity each time. Ids come from a process-wide monotonic counter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoutingKey<K> {
    routing: K,
    id: u64,
}

impl<K> RoutingKey<K> {
    /// Allocate a fresh routing key for `routing`.
    pub fn new(routing: K) -> Self {
        Self {
            routing,
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Recreate a routing key persisted with [`RoutingKey::id`].
    ///
    /// The process-wide counter is advanced past `id`, so keys allocated
    /// afterwards with [`RoutingKey::new`] never collide with it. Restoring the
    /// same id twice yields equal keys; callers restore a given bundle once.
    pub fn restore(routing: K, id: u64) -> Self {
        NEXT_ID.fetch_max(id.saturating_add(1), Ordering::Relaxed);
        Self { routing, id }
    }

    /// The logical key.
    pub fn routing(&self) -> &K {
        &self.routing
    }

    /// The instance id.
    pub fn id(&self) -> u64 {
        self.id
    }
}
