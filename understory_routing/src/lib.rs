// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_routing --heading-base-level=0

//! Understory Routing: observable routing sources for node-based navigation.
//!
//! A parent node hosts a set of children. Which children exist, and what state
//! each one is in, is owned by a [`RoutingSource`]. The parent reads the
//! source's [`elements`](RoutingSource::elements) to create and release child
//! nodes; the rendering layer reads the same snapshot to animate transitions.
//!
//! ## Concepts
//!
//! - [`RoutingKey`]: a logical child key plus a process-wide instance id. The
//!   same key pushed twice yields two distinct routing keys.
//! - [`RoutingElement`]: an immutable `{ key, from_state, target_state }`
//!   snapshot entry. The renderer animates `from_state -> target_state`.
//! - [`StateFlow`]: a hot, replay-of-one observable. Late subscribers get the
//!   current value immediately, then every later value in emission order.
//! - [`RoutingSource`]: the contract every variant implements: elements,
//!   back handling, and the transition-finished acknowledgement.
//!
//! ## Two-phase removal
//!
//! Removing an element never drops it from the stream directly. The element
//! transitions to a destroyed target state and stays visible so the renderer
//! can animate it out. Only when the consumer calls
//! [`RoutingSource::on_transition_finished`] for that [`RoutingKey`] does it
//! leave the stream. Acknowledging an unknown or already-settled key is a
//! no-op.
//!
//! ## Variants
//!
//! - [`Spotlight`]: a fixed carousel of keys with one active index. Nothing is
//!   ever removed.
//! - [`BackStack`]: push/pop navigation with two-phase removal.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_routing::{RoutingSource, Spotlight};
//!
//! let mut spotlight = Spotlight::new(vec!['A', 'B', 'C'], 0, None);
//! assert!(spotlight.has_next());
//! assert!(!*spotlight.can_handle_back_press().get());
//!
//! spotlight.next();
//! assert_eq!(spotlight.active_index(), 1);
//!
//! // Back goes to the previous element.
//! assert!(spotlight.handle_up_navigation());
//! assert_eq!(spotlight.active_index(), 0);
//! ```
//!
//! ## Saved state
//!
//! [`RoutingSource::save_instance_state`] writes a [`SavedStateMap`] made of
//! [`SavedValue`] primitives. Passing the same map to a fresh source restores
//! the same position. Inconsistent snapshots degrade to safe defaults rather
//! than failing. Application keys opt in by implementing [`Saveable`].
//!
//! ## Features
//!
//! - `std` (default): enables `std` support in dependencies.
//! - `serde`: derives `Serialize`/`Deserialize` for [`SavedValue`], so hosts
//!   can persist bundles with any serde format.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod back_stack;
mod element;
mod flow;
mod key;
mod saved_state;
mod source;
mod spotlight;
pub mod transitions;

pub use back_stack::{BackStack, BackStackBackPress, BackStackConfig, BackStackState};
pub use element::{RoutingElement, RoutingElements, RoutingState};
pub use flow::{StateFlow, SubscriptionId};
pub use key::RoutingKey;
pub use saved_state::{Saveable, SavedStateError, SavedStateMap, SavedValue};
pub use source::{RoutingSource, handle_up_navigation};
pub use spotlight::{
    Direction, Spotlight, SpotlightBackPress, SpotlightConfig, SpotlightPosition, SpotlightState,
};
