// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A node whose children are driven by a routing source.

use alloc::boxed::Box;
use alloc::string::ToString;
use hashbrown::HashMap;

use understory_lifecycle::{LifecycleOwner, LifecycleRegistry, State};
use understory_routing::{RoutingKey, RoutingSource, RoutingState, SavedStateMap, SavedValue};

use crate::node::{BuildContext, Node, Resolve};

const CHILDREN_STATE: &str = "ChildrenState";

/// Hosts one child [`Node`] per render-eligible routing element.
///
/// ## Reconciliation
///
/// After every mutation made through the parent ([`navigate`](Self::navigate),
/// [`on_transition_finished`](Self::on_transition_finished), up navigation,
/// lifecycle changes) the children are reconciled against the routing
/// source's current elements, by [`RoutingKey`]:
///
/// - an element that is on screen and has no child yet gets one from the
///   resolver; re-emitting the same key never builds a second child;
/// - an on-screen child follows the parent's lifecycle state;
/// - an off-screen child stays alive but is capped at [`State::Created`];
/// - a child whose element left the stream is moved to [`State::Destroyed`]
///   and dropped.
///
/// Moving down, children are updated before the parent; moving up, the parent
/// goes first. A destroyed parent destroys all children and attaches no new
/// ones.
///
/// ## Saved state
///
/// The routing source saves into the parent's bundle. Child bundles go under
/// the reserved `"ChildrenState"` entry, keyed by routing-key id, so a source
/// must not use that name as its own entry.
pub struct ParentNode<R: RoutingSource> {
    lifecycle: LifecycleRegistry,
    routing_source: R,
    resolver: Box<dyn Resolve<R::Key>>,
    children: HashMap<RoutingKey<R::Key>, Box<dyn Node>>,
    /// Saved child bundles not yet handed to a child, by routing-key id.
    restored_children: HashMap<u64, SavedStateMap>,
}

impl<R: RoutingSource + core::fmt::Debug> core::fmt::Debug for ParentNode<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParentNode")
            .field("lifecycle", &self.lifecycle)
            .field("routing_source", &self.routing_source)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl<R: RoutingSource> ParentNode<R> {
    /// Build a parent.
    ///
    /// `make_source` receives the saved bundle from `ctx`, if any, so the
    /// routing source can restore itself. Saved child bundles are kept and
    /// handed to children as they are built.
    pub fn new(
        ctx: BuildContext,
        make_source: impl FnOnce(Option<&SavedStateMap>) -> R,
        resolver: impl Resolve<R::Key> + 'static,
    ) -> Self {
        let saved = ctx.into_saved_state();
        let routing_source = make_source(saved.as_ref());
        let restored_children = saved
            .as_ref()
            .and_then(|map| map.get(CHILDREN_STATE))
            .map(decode_children)
            .unwrap_or_default();

        let mut node = Self {
            lifecycle: LifecycleRegistry::new(),
            routing_source,
            resolver: Box::new(resolver),
            children: HashMap::new(),
            restored_children,
        };
        node.sync_children();
        node
    }

    /// The routing source, for subscribing to its flows.
    pub fn routing_source(&self) -> &R {
        &self.routing_source
    }

    /// Mutate the routing source, then reconcile children.
    pub fn navigate<T>(&mut self, op: impl FnOnce(&mut R) -> T) -> T {
        let out = op(&mut self.routing_source);
        self.sync_children();
        out
    }

    /// Forward a transition-finished acknowledgement and reconcile.
    pub fn on_transition_finished(&mut self, key: &RoutingKey<R::Key>) {
        self.routing_source.on_transition_finished(key);
        self.sync_children();
    }

    /// Number of live child nodes.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The child built for `key`.
    pub fn child(&self, key: &RoutingKey<R::Key>) -> Option<&dyn Node> {
        self.children.get(key).map(Box::as_ref)
    }

    /// Mutable access to the child built for `key`.
    pub fn child_mut(&mut self, key: &RoutingKey<R::Key>) -> Option<&mut (dyn Node + 'static)> {
        self.children.get_mut(key).map(|child| &mut **child)
    }

    /// Live children in element order.
    pub fn children(&self) -> impl Iterator<Item = (&RoutingKey<R::Key>, &dyn Node)> {
        self.routing_source
            .elements()
            .get()
            .iter()
            .filter_map(|element| {
                let key = element.key();
                self.children.get(key).map(|child| (key, child.as_ref()))
            })
    }

    /// Reconcile children against the routing source at the parent's current
    /// state.
    pub fn sync_children(&mut self) {
        self.sync_children_at(self.lifecycle.current_state());
    }

    fn sync_children_at(&mut self, parent: State) {
        let elements = self.routing_source.elements().value();
        let destroyed = parent == State::Destroyed;

        self.children.retain(|key, child| {
            let keep = !destroyed && elements.iter().any(|e| e.key() == key);
            if !keep {
                tracing::debug!(id = key.id(), routing = ?key.routing(), "detaching child");
                child.update_lifecycle_state(State::Destroyed);
            }
            keep
        });
        if destroyed {
            self.restored_children.clear();
            return;
        }

        for element in elements.iter() {
            let key = element.key();
            let on_screen = element.is_on_screen();
            if !self.children.contains_key(key) {
                if !on_screen {
                    continue;
                }
                let ctx = match self.restored_children.remove(&key.id()) {
                    Some(saved) => BuildContext::restored(saved),
                    None => BuildContext::root(),
                };
                tracing::debug!(id = key.id(), routing = ?key.routing(), "attaching child");
                let child = self.resolver.resolve(key.routing(), ctx);
                self.children.insert(key.clone(), child);
            }
            if let Some(child) = self.children.get_mut(key) {
                child.update_lifecycle_state(child_target(parent, on_screen));
            }
        }
    }
}

/// Where a child should be given its parent's state and its visibility.
fn child_target(parent: State, on_screen: bool) -> State {
    if on_screen {
        parent
    } else {
        parent.min(State::Created)
    }
}

fn decode_children(value: &SavedValue) -> HashMap<u64, SavedStateMap> {
    let Ok(entries) = value.as_map() else {
        tracing::warn!(found = value.kind(), "children state is not a map; ignored");
        return HashMap::new();
    };
    entries
        .iter()
        .filter_map(|(id, saved)| match (id.parse::<u64>(), saved.as_map()) {
            (Ok(id), Ok(map)) => Some((id, map.clone())),
            _ => {
                tracing::warn!(%id, "undecodable child state; ignored");
                None
            }
        })
        .collect()
}

impl<R: RoutingSource> LifecycleOwner for ParentNode<R> {
    fn lifecycle(&self) -> &LifecycleRegistry {
        &self.lifecycle
    }
}

impl<R: RoutingSource + 'static> Node for ParentNode<R> {
    fn lifecycle_mut(&mut self) -> &mut LifecycleRegistry {
        &mut self.lifecycle
    }

    fn update_lifecycle_state(&mut self, state: State) {
        if state < self.lifecycle.current_state() {
            self.sync_children_at(state);
            self.lifecycle.set_current_state(state);
        } else {
            self.lifecycle.set_current_state(state);
            self.sync_children();
        }
    }

    /// On-screen children get the request first, topmost first; then the
    /// routing source.
    fn handle_up_navigation(&mut self) -> bool {
        let elements = self.routing_source.elements().value();
        for element in elements.iter().rev() {
            if !element.state().is_on_screen() {
                continue;
            }
            if let Some(child) = self.children.get_mut(element.key())
                && child.handle_up_navigation()
            {
                return true;
            }
        }
        let handled = self.routing_source.handle_up_navigation();
        if handled {
            self.sync_children();
        }
        handled
    }

    fn save_instance_state(&self, map: &mut SavedStateMap) {
        self.routing_source.save_instance_state(map);

        let elements = self.routing_source.elements().get();
        let mut children = SavedStateMap::new();
        for element in elements.iter().filter(|e| !e.is_pending_destruction()) {
            let id = element.key().id();
            let saved = match self.children.get(element.key()) {
                Some(child) => {
                    let mut saved = SavedStateMap::new();
                    child.save_instance_state(&mut saved);
                    saved
                }
                None => match self.restored_children.get(&id) {
                    Some(saved) => saved.clone(),
                    None => continue,
                },
            };
            if !saved.is_empty() {
                children.insert(id.to_string(), SavedValue::Map(saved));
            }
        }
        if map
            .insert(CHILDREN_STATE.into(), SavedValue::Map(children))
            .is_some()
        {
            tracing::warn!(
                key = CHILDREN_STATE,
                "routing source saved under a reserved entry; overwritten"
            );
        }
    }
}
