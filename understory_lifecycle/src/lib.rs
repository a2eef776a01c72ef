// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Lifecycle: lifecycle states, events, and observer dispatch.
//!
//! Nodes in an Understory navigation tree move through a small, ordered set of
//! lifecycle [`State`]s. Each single-step move between adjacent states is an
//! [`Event`]. Interested parties register observers on a [`LifecycleRegistry`]
//! and receive those events in a deterministic order.
//!
//! There are two observer capabilities:
//!
//! - [`DefaultLifecycleObserver`]: six optional hooks (`on_create` through
//!   `on_destroy`), all no-ops by default.
//! - [`LifecycleEventObserver`]: a single `on_state_changed` hook receiving
//!   every [`Event`].
//!
//! A type implementing both ([`FullLifecycleObserver`]) receives the coarse
//! hook first and then `on_state_changed` for the same event.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_lifecycle::{Event, LifecycleRegistry, State};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut registry = LifecycleRegistry::new();
//! let sink = seen.clone();
//! registry.add_event_observer(move |event: Event| sink.borrow_mut().push(event));
//!
//! registry.set_current_state(State::Resumed);
//! registry.set_current_state(State::Created);
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     [
//!         Event::OnCreate,
//!         Event::OnStart,
//!         Event::OnResume,
//!         Event::OnPause,
//!         Event::OnStop,
//!     ]
//! );
//! ```
//!
//! Where the lifecycle signal comes from (a window, a platform activity, a test
//! harness) is up to the host. This crate only orders and dispatches it.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod observer;
mod registry;
mod state;

pub use observer::{DefaultLifecycleObserver, FullLifecycleObserver, LifecycleEventObserver};
pub use registry::{LifecycleOwner, LifecycleRegistry, ObserverId};
pub use state::{Event, State};
