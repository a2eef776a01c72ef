// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node contract and the plain leaf node.

use alloc::boxed::Box;

use understory_lifecycle::{LifecycleOwner, LifecycleRegistry, State};
use understory_routing::SavedStateMap;

/// A lifecycle-bound unit of UI hosted by a parent.
pub trait Node: LifecycleOwner {
    /// Mutable access to the node's lifecycle, for moving it and registering
    /// observers.
    fn lifecycle_mut(&mut self) -> &mut LifecycleRegistry;

    /// Move the node to `state`.
    ///
    /// Parents call this to propagate their own lifecycle. Nodes with children
    /// override it to propagate further.
    fn update_lifecycle_state(&mut self, state: State) {
        self.lifecycle_mut().set_current_state(state);
    }

    /// Consume an up/back navigation request if possible.
    fn handle_up_navigation(&mut self) -> bool {
        false
    }

    /// Write the node's state into `map`.
    fn save_instance_state(&self, map: &mut SavedStateMap) {
        let _ = map;
    }
}

/// What a node is built with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildContext {
    saved_state: Option<SavedStateMap>,
}

impl BuildContext {
    /// A context for a node with no saved state.
    pub fn root() -> Self {
        Self::default()
    }

    /// A context restoring a node from `saved_state`.
    pub fn restored(saved_state: SavedStateMap) -> Self {
        Self {
            saved_state: Some(saved_state),
        }
    }

    /// The bundle this node was saved into, if any.
    pub fn saved_state(&self) -> Option<&SavedStateMap> {
        self.saved_state.as_ref()
    }

    /// Take ownership of the saved bundle.
    pub fn into_saved_state(self) -> Option<SavedStateMap> {
        self.saved_state
    }
}

/// Builds child nodes for a parent from application keys.
///
/// Implemented for every `FnMut(&K, BuildContext) -> Box<dyn Node>`. Matching
/// on an enum of keys inside the closure keeps resolution exhaustive.
pub trait Resolve<K> {
    /// Build the node for `key`.
    fn resolve(&mut self, key: &K, ctx: BuildContext) -> Box<dyn Node>;
}

impl<K, F> Resolve<K> for F
where
    F: FnMut(&K, BuildContext) -> Box<dyn Node>,
{
    fn resolve(&mut self, key: &K, ctx: BuildContext) -> Box<dyn Node> {
        self(key, ctx)
    }
}

/// A node without children, carrying a small saved-state bundle.
///
/// Whatever is stored in [`LeafNode::state_mut`] survives
/// [`Node::save_instance_state`] and comes back through the [`BuildContext`].
#[derive(Debug, Default)]
pub struct LeafNode {
    lifecycle: LifecycleRegistry,
    state: SavedStateMap,
}

impl LeafNode {
    /// Create a leaf, restoring its bundle from `ctx`.
    pub fn new(ctx: BuildContext) -> Self {
        Self {
            lifecycle: LifecycleRegistry::new(),
            state: ctx.into_saved_state().unwrap_or_default(),
        }
    }

    /// The persisted bundle.
    pub fn state(&self) -> &SavedStateMap {
        &self.state
    }

    /// Mutable access to the persisted bundle.
    pub fn state_mut(&mut self) -> &mut SavedStateMap {
        &mut self.state
    }
}

impl LifecycleOwner for LeafNode {
    fn lifecycle(&self) -> &LifecycleRegistry {
        &self.lifecycle
    }
}

impl Node for LeafNode {
    fn lifecycle_mut(&mut self) -> &mut LifecycleRegistry {
        &mut self.lifecycle
    }

    fn save_instance_state(&self, map: &mut SavedStateMap) {
        map.extend(self.state.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_routing::SavedValue;

    #[test]
    fn leaf_state_round_trips() {
        let mut leaf = LeafNode::new(BuildContext::root());
        leaf.state_mut().insert("counter".into(), SavedValue::Int(3));

        let mut map = SavedStateMap::new();
        leaf.save_instance_state(&mut map);
        let restored = LeafNode::new(BuildContext::restored(map));

        assert_eq!(restored.state().get("counter"), Some(&SavedValue::Int(3)));
    }

    #[test]
    fn closures_resolve() {
        let mut resolver = |key: &u8, ctx: BuildContext| -> Box<dyn Node> {
            let mut leaf = LeafNode::new(ctx);
            leaf.state_mut().insert("key".into(), SavedValue::Int(i64::from(*key)));
            Box::new(leaf)
        };
        let mut node = resolver.resolve(&7, BuildContext::root());

        node.update_lifecycle_state(State::Started);
        assert_eq!(node.lifecycle().current_state(), State::Started);
        assert!(!node.handle_up_navigation());

        let mut map = SavedStateMap::new();
        node.save_instance_state(&mut map);
        assert_eq!(map.get("key"), Some(&SavedValue::Int(7)));
    }
}
