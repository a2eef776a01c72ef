// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing elements and the state contract variants implement.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::key::RoutingKey;

/// Per-variant element state.
pub trait RoutingState: Copy + Eq + Debug {
    /// Whether an element in this state should be rendered.
    fn is_on_screen(&self) -> bool;

    /// Whether this is the terminal state. Elements whose target state is
    /// destroyed leave the stream once their transition is acknowledged.
    fn is_destroyed(&self) -> bool {
        false
    }
}

/// Snapshot of one element: its identity and the transition it is in.
///
/// Elements are immutable. Every mutation of a routing source publishes new
/// elements; consumers diff snapshots by [`RoutingKey`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingElement<K, S> {
    key: RoutingKey<K>,
    from_state: S,
    target_state: S,
}

/// Ordered snapshot of a routing source.
pub type RoutingElements<K, S> = Vec<RoutingElement<K, S>>;

impl<K, S: RoutingState> RoutingElement<K, S> {
    /// An element settled in `state`.
    pub fn new(key: RoutingKey<K>, state: S) -> Self {
        Self {
            key,
            from_state: state,
            target_state: state,
        }
    }

    /// An element transitioning from `from_state` to `target_state`.
    pub fn transitioning(key: RoutingKey<K>, from_state: S, target_state: S) -> Self {
        Self {
            key,
            from_state,
            target_state,
        }
    }

    /// The element's identity.
    pub fn key(&self) -> &RoutingKey<K> {
        &self.key
    }

    /// The state the element is leaving.
    pub fn from_state(&self) -> S {
        self.from_state
    }

    /// The element's current logical state.
    pub fn state(&self) -> S {
        self.target_state
    }

    /// Whether a transition is awaiting acknowledgement.
    pub fn is_transitioning(&self) -> bool {
        self.from_state != self.target_state
    }

    /// Whether the element is removed pending acknowledgement.
    pub fn is_pending_destruction(&self) -> bool {
        self.target_state.is_destroyed()
    }

    /// Render eligibility: on screen at either end of its transition.
    pub fn is_on_screen(&self) -> bool {
        self.from_state.is_on_screen() || self.target_state.is_on_screen()
    }

    /// Start a transition towards `target`.
    ///
    /// The transition starts from the current target state, so an element
    /// redirected mid-animation animates from where it was heading.
    pub fn transition_to(&self, target: S) -> Self
    where
        K: Clone,
    {
        Self {
            key: self.key.clone(),
            from_state: self.target_state,
            target_state: target,
        }
    }

    /// The same element with its transition acknowledged.
    pub fn settled(&self) -> Self
    where
        K: Clone,
    {
        Self::new(self.key.clone(), self.target_state)
    }
}
