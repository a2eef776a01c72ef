// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Node: lifecycle-bound nodes hosted by routing-driven parents.
//!
//! A [`Node`] owns a [`LifecycleRegistry`](understory_lifecycle::LifecycleRegistry)
//! and can take part in up navigation and saved-state restoration. A
//! [`ParentNode`] owns a [`RoutingSource`](understory_routing::RoutingSource)
//! and a [`Resolve`] capability, and keeps exactly one child node per
//! render-eligible routing element.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_lifecycle::State;
//! use understory_node::{BuildContext, LeafNode, Node, ParentNode};
//! use understory_routing::BackStack;
//!
//! let mut parent = ParentNode::new(
//!     BuildContext::root(),
//!     |saved| BackStack::new(String::from("home"), saved),
//!     |_: &String, ctx: BuildContext| -> Box<dyn Node> { Box::new(LeafNode::new(ctx)) },
//! );
//! parent.update_lifecycle_state(State::Resumed);
//! parent.navigate(|stack| stack.push("details".into()));
//! assert_eq!(parent.child_count(), 2);
//!
//! // Back pops "details"; its node lives until the exit transition finishes.
//! assert!(parent.handle_up_navigation());
//! let details = parent.children().last().map(|(key, _)| key.clone()).unwrap();
//! assert_eq!(details.routing(), "details");
//! parent.on_transition_finished(&details);
//! assert_eq!(parent.child_count(), 1);
//! ```
//!
//! ## Up navigation
//!
//! [`Node::handle_up_navigation`] forms a chain of responsibility: a parent
//! offers the request to its on-screen children, topmost first, and only then
//! to its own routing source.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod node;
mod parent;

pub use node::{BuildContext, LeafNode, Node, Resolve};
pub use parent::ParentNode;
