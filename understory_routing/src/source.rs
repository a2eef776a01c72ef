// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The routing source contract.

use core::fmt::Debug;
use core::hash::Hash;

use crate::element::{RoutingElements, RoutingState};
use crate::flow::StateFlow;
use crate::key::RoutingKey;
use crate::saved_state::SavedStateMap;

/// Owner of a parent node's routing elements.
///
/// All mutations happen on the owner's execution context through `&mut self`.
/// Each mutation publishes exactly one new [`elements`](Self::elements)
/// snapshot; operations that would not change anything publish nothing.
pub trait RoutingSource {
    /// Application-level key of a child.
    type Key: Clone + Eq + Hash + Debug;
    /// Per-element state.
    type State: RoutingState;

    /// Current elements, in variant-defined order.
    fn elements(&self) -> &StateFlow<RoutingElements<Self::Key, Self::State>>;

    /// Whether [`on_back_pressed`](Self::on_back_pressed) would change anything.
    fn can_handle_back_press(&self) -> &StateFlow<bool>;

    /// Perform back navigation if [`can_handle_back_press`](Self::can_handle_back_press)
    /// is true; otherwise do nothing.
    fn on_back_pressed(&mut self);

    /// Acknowledge that the transition of the element identified by `key` has
    /// finished.
    ///
    /// Finalises a pending removal. Unknown or already-settled keys are ignored,
    /// so acknowledging twice is harmless.
    fn on_transition_finished(&mut self, key: &RoutingKey<Self::Key>);

    /// Write enough state into `map` for a fresh source to restore the same
    /// position.
    fn save_instance_state(&self, map: &mut SavedStateMap) {
        let _ = map;
    }

    /// Consume an up/back navigation request if possible.
    ///
    /// Returns whether the request was handled.
    fn handle_up_navigation(&mut self) -> bool {
        handle_up_navigation(self)
    }
}

/// Default up-navigation: check [`RoutingSource::can_handle_back_press`] and,
/// if set, call [`RoutingSource::on_back_pressed`].
pub fn handle_up_navigation<R: RoutingSource + ?Sized>(source: &mut R) -> bool {
    let handled = *source.can_handle_back_press().get();
    if handled {
        source.on_back_pressed();
    }
    handled
}
