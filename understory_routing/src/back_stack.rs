// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Back stack: push/pop navigation with two-phase removal.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;
use hashbrown::HashSet;

use crate::element::{RoutingElement, RoutingElements, RoutingState};
use crate::flow::StateFlow;
use crate::key::RoutingKey;
use crate::saved_state::{Saveable, SavedStateError, SavedStateMap, SavedValue};
use crate::source::RoutingSource;
use crate::transitions;

const ELEMENTS: &str = "elements";
const ROUTING: &str = "routing";
const ID: &str = "id";
const STATE: &str = "state";

/// State of a back stack element.
///
/// `Created -> Active <-> Stashed -> Destroyed`. An element whose target is
/// [`BackStackState::Destroyed`] stays in the stream, pending destruction,
/// until its transition is acknowledged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BackStackState {
    /// Just pushed, not yet shown.
    Created,
    /// The top of the stack.
    Active,
    /// Below the top, kept alive.
    Stashed,
    /// Removed.
    Destroyed,
}

impl RoutingState for BackStackState {
    fn is_on_screen(&self) -> bool {
        matches!(self, Self::Active)
    }

    fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}

impl Saveable for BackStackState {
    fn save(&self) -> SavedValue {
        let name = match self {
            Self::Created => "Created",
            Self::Active => "Active",
            Self::Stashed => "Stashed",
            Self::Destroyed => "Destroyed",
        };
        SavedValue::Str(name.into())
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        match value.as_str()? {
            "Created" => Ok(Self::Created),
            "Active" => Ok(Self::Active),
            "Stashed" => Ok(Self::Stashed),
            "Destroyed" => Ok(Self::Destroyed),
            other => Err(SavedStateError::UnknownVariant(other.into())),
        }
    }
}

/// What back navigation does on a [`BackStack`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackStackBackPress {
    /// Pop the active element while more than one remains.
    #[default]
    Pop,
    /// Never handle back navigation.
    Disabled,
}

/// Configuration for a [`BackStack`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackStackConfig {
    /// Back navigation behavior.
    pub back_press: BackStackBackPress,
    /// Entry name used in the saved-state bundle.
    ///
    /// `"ChildrenState"` is reserved by `understory_node`'s `ParentNode`,
    /// which stores child bundles under it in the same map.
    pub state_key: String,
    /// Upper bound on elements pending destruction.
    ///
    /// `None` waits indefinitely for acknowledgements. With `Some(n)`, once
    /// more than `n` elements are pending, the oldest are finalised without
    /// acknowledgement and a warning is logged.
    pub max_pending_destructions: Option<usize>,
}

impl Default for BackStackConfig {
    fn default() -> Self {
        Self {
            back_press: BackStackBackPress::default(),
            state_key: "BackStack".into(),
            max_pending_destructions: None,
        }
    }
}

/// A stack of keys where only the top element is active.
///
/// Elements removed by [`pop`](BackStack::pop), [`replace`](BackStack::replace),
/// [`new_root`](BackStack::new_root), [`single_top`](BackStack::single_top) or
/// [`remove`](BackStack::remove) move to [`BackStackState::Destroyed`] and
/// remain in [`elements`](RoutingSource::elements) until
/// [`on_transition_finished`](RoutingSource::on_transition_finished) is called
/// for them. The stack always keeps at least one live element.
///
/// ## Example
///
/// ```rust
/// use understory_routing::{BackStack, BackStackState, RoutingSource};
///
/// let mut stack = BackStack::new('A', None);
/// stack.push('B');
/// let b = stack.active_key().unwrap();
///
/// assert!(stack.pop());
/// // B is still in the stream, on its way out.
/// assert_eq!(stack.elements().get().len(), 2);
/// assert_eq!(stack.elements().get()[1].state(), BackStackState::Destroyed);
///
/// stack.on_transition_finished(&b);
/// assert_eq!(stack.elements().get().len(), 1);
/// assert_eq!(stack.active_key().map(|k| *k.routing()), Some('A'));
/// ```
pub struct BackStack<K> {
    config: BackStackConfig,
    elements: StateFlow<RoutingElements<K, BackStackState>>,
    can_handle_back_press: StateFlow<bool>,
    /// Pending-destruction keys, oldest first.
    pending: VecDeque<RoutingKey<K>>,
}

impl<K: Debug> Debug for BackStack<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackStack")
            .field("config", &self.config)
            .field("elements", self.elements.get())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<K> BackStack<K>
where
    K: Clone + Eq + Hash + Debug + Saveable,
{
    /// Create a stack holding `initial`, restoring from `saved_state` when it
    /// holds a back stack entry.
    pub fn new(initial: K, saved_state: Option<&SavedStateMap>) -> Self {
        Self::with_config(initial, saved_state, BackStackConfig::default())
    }

    /// Like [`BackStack::new`] with an explicit configuration.
    pub fn with_config(
        initial: K,
        saved_state: Option<&SavedStateMap>,
        config: BackStackConfig,
    ) -> Self {
        let restored = saved_state
            .and_then(|map| map.get(config.state_key.as_str()))
            .map(restore::<K>);

        let elements = match restored {
            Some(Ok(elements)) => elements,
            Some(Err(error)) => {
                tracing::warn!(%error, state_key = %config.state_key, "back stack state not restored; using initial key");
                alloc::vec![RoutingElement::new(RoutingKey::new(initial), BackStackState::Active)]
            }
            None => {
                alloc::vec![RoutingElement::new(RoutingKey::new(initial), BackStackState::Active)]
            }
        };
        let can_back = can_go_back(config.back_press, &elements);

        Self {
            config,
            elements: StateFlow::new(elements),
            can_handle_back_press: StateFlow::new(can_back),
            pending: VecDeque::new(),
        }
    }

    /// Key of the active element.
    pub fn active_key(&self) -> Option<RoutingKey<K>> {
        active_index(self.elements.get()).map(|i| self.elements.get()[i].key().clone())
    }

    /// Number of live (not pending destruction) elements.
    pub fn len(&self) -> usize {
        live_count(self.elements.get())
    }

    /// Always `false`: the stack keeps at least one live element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements awaiting a transition-finished acknowledgement
    /// before they leave the stream.
    pub fn pending_destructions(&self) -> usize {
        self.pending.len()
    }

    /// Push `routing` on top. The current top is stashed.
    pub fn push(&mut self, routing: K) {
        let mut next = self.snapshot();
        if let Some(i) = active_index(&next) {
            next[i] = next[i].transition_to(BackStackState::Stashed);
        }
        let key = RoutingKey::new(routing);
        tracing::debug!(id = key.id(), routing = ?key.routing(), "back stack push");
        next.push(RoutingElement::transitioning(
            key,
            BackStackState::Created,
            BackStackState::Active,
        ));
        self.publish(next);
    }

    /// Remove the top element and reactivate the one below it.
    ///
    /// Returns `false` (and does nothing) if only one live element remains.
    pub fn pop(&mut self) -> bool {
        let Some(top) = active_index(self.elements.get()) else {
            return false;
        };
        let Some(below) = last_stashed_before(self.elements.get(), top) else {
            return false;
        };
        let mut next = self.snapshot();
        tracing::debug!(id = next[top].key().id(), "back stack pop");
        self.destroy(&mut next, top);
        next[below] = next[below].transition_to(BackStackState::Active);
        self.publish(next);
        true
    }

    /// Replace the top element with `routing`.
    pub fn replace(&mut self, routing: K) {
        let mut next = self.snapshot();
        if let Some(top) = active_index(&next) {
            self.destroy(&mut next, top);
        }
        let key = RoutingKey::new(routing);
        tracing::debug!(id = key.id(), routing = ?key.routing(), "back stack replace");
        next.push(RoutingElement::transitioning(
            key,
            BackStackState::Created,
            BackStackState::Active,
        ));
        self.publish(next);
    }

    /// Make `routing` the only live element.
    ///
    /// If the active element already has this routing it is kept and everything
    /// below it is destroyed; otherwise every live element is destroyed and a
    /// new one is pushed. Returns `false` if nothing changed.
    pub fn new_root(&mut self, routing: K) -> bool {
        let top = active_index(self.elements.get());
        let keep = top.filter(|&i| *self.elements.get()[i].key().routing() == routing);
        if keep.is_some() && self.len() == 1 {
            return false;
        }

        let mut next = self.snapshot();
        for i in 0..next.len() {
            if Some(i) != keep && !next[i].state().is_destroyed() {
                self.destroy(&mut next, i);
            }
        }
        if keep.is_none() {
            let key = RoutingKey::new(routing);
            tracing::debug!(id = key.id(), routing = ?key.routing(), "back stack new root");
            next.push(RoutingElement::transitioning(
                key,
                BackStackState::Created,
                BackStackState::Active,
            ));
        }
        self.publish(next);
        true
    }

    /// Bring `routing` to the top.
    ///
    /// If a stashed element with this routing exists, every live element above
    /// it is destroyed and it becomes active. If the active element already has
    /// this routing nothing happens. Otherwise `routing` is pushed.
    /// Returns whether anything changed.
    pub fn single_top(&mut self, routing: K) -> bool {
        let Some(top) = active_index(self.elements.get()) else {
            self.push(routing);
            return true;
        };
        if *self.elements.get()[top].key().routing() == routing {
            return false;
        }
        let found = self.elements.get().iter().rposition(|e| {
            e.state() == BackStackState::Stashed && *e.key().routing() == routing
        });
        let Some(target) = found else {
            self.push(routing);
            return true;
        };

        let mut next = self.snapshot();
        for i in target + 1..next.len() {
            if !next[i].state().is_destroyed() {
                self.destroy(&mut next, i);
            }
        }
        tracing::debug!(id = next[target].key().id(), "back stack single top");
        next[target] = next[target].transition_to(BackStackState::Active);
        self.publish(next);
        true
    }

    /// Remove a specific element.
    ///
    /// Removing the active element behaves like [`BackStack::pop`]. Returns
    /// `false` if `key` is unknown, already pending destruction, or the last
    /// live element.
    pub fn remove(&mut self, key: &RoutingKey<K>) -> bool {
        let elements = self.elements.get();
        let Some(idx) = elements.iter().position(|e| e.key() == key) else {
            return false;
        };
        if elements[idx].state().is_destroyed() || live_count(elements) <= 1 {
            return false;
        }
        if Some(idx) == active_index(elements) {
            return self.pop();
        }
        let mut next = self.snapshot();
        tracing::debug!(id = key.id(), "back stack remove");
        self.destroy(&mut next, idx);
        self.publish(next);
        true
    }

    /// Acknowledge every in-flight transition, dropping all elements pending
    /// destruction.
    pub fn finish_all_transitions(&mut self) {
        if let Some(next) = transitions::settle_all(self.elements.get()) {
            self.pending.clear();
            self.elements.emit(next);
        }
    }

    fn snapshot(&self) -> RoutingElements<K, BackStackState> {
        self.elements.get().clone()
    }

    fn destroy(&mut self, next: &mut RoutingElements<K, BackStackState>, idx: usize) {
        next[idx] = next[idx].transition_to(BackStackState::Destroyed);
        self.pending.push_back(next[idx].key().clone());
    }

    fn publish(&mut self, mut next: RoutingElements<K, BackStackState>) {
        if let Some(max) = self.config.max_pending_destructions {
            while self.pending.len() > max {
                let Some(stale) = self.pending.pop_front() else {
                    break;
                };
                tracing::warn!(id = stale.id(), routing = ?stale.routing(), "forcing removal of unacknowledged element");
                next.retain(|e| e.key() != &stale);
            }
        }
        let can_back = can_go_back(self.config.back_press, &next);
        self.elements.emit(next);
        self.can_handle_back_press.emit_if_changed(can_back);
    }
}

impl<K> RoutingSource for BackStack<K>
where
    K: Clone + Eq + Hash + Debug + Saveable,
{
    type Key = K;
    type State = BackStackState;

    fn elements(&self) -> &StateFlow<RoutingElements<K, BackStackState>> {
        &self.elements
    }

    fn can_handle_back_press(&self) -> &StateFlow<bool> {
        &self.can_handle_back_press
    }

    fn on_back_pressed(&mut self) {
        if *self.can_handle_back_press.get() {
            self.pop();
        }
    }

    fn on_transition_finished(&mut self, key: &RoutingKey<K>) {
        match transitions::settle(self.elements.get(), key) {
            Some(next) => {
                self.pending.retain(|k| k != key);
                self.elements.emit(next);
            }
            None => tracing::trace!(id = key.id(), "transition already settled"),
        }
    }

    /// Saves live elements with their identities. In-flight transitions are
    /// saved at their target state; elements pending destruction are dropped.
    fn save_instance_state(&self, map: &mut SavedStateMap) {
        let saved: Vec<SavedValue> = self
            .elements
            .get()
            .iter()
            .filter(|e| !e.state().is_destroyed())
            .map(|e| {
                let mut entry = SavedStateMap::new();
                entry.insert(ROUTING.into(), e.key().routing().save());
                entry.insert(ID.into(), e.key().id().save());
                entry.insert(STATE.into(), e.state().save());
                SavedValue::Map(entry)
            })
            .collect();
        let mut entry = SavedStateMap::new();
        entry.insert(ELEMENTS.into(), SavedValue::List(saved));
        map.insert(self.config.state_key.clone(), SavedValue::Map(entry));
    }
}

fn active_index<K>(elements: &[RoutingElement<K, BackStackState>]) -> Option<usize> {
    elements.iter().rposition(|e| e.state() == BackStackState::Active)
}

fn last_stashed_before<K>(
    elements: &[RoutingElement<K, BackStackState>],
    before: usize,
) -> Option<usize> {
    elements[..before]
        .iter()
        .rposition(|e| e.state() == BackStackState::Stashed)
}

fn live_count<K>(elements: &[RoutingElement<K, BackStackState>]) -> usize {
    elements
        .iter()
        .filter(|e| !e.state().is_destroyed())
        .count()
}

fn can_go_back<K>(
    back_press: BackStackBackPress,
    elements: &[RoutingElement<K, BackStackState>],
) -> bool {
    match back_press {
        BackStackBackPress::Pop => live_count(elements) > 1,
        BackStackBackPress::Disabled => false,
    }
}

/// Decode saved elements, normalising them so exactly the last live element
/// is active.
fn restore<K: Saveable>(
    value: &SavedValue,
) -> Result<RoutingElements<K, BackStackState>, SavedStateError> {
    let mut elements = Vec::new();
    let mut seen = HashSet::new();
    for entry in value.field(ELEMENTS)?.as_list()? {
        let routing = K::restore(entry.field(ROUTING)?)?;
        let id = u64::restore(entry.field(ID)?)?;
        let state = BackStackState::restore(entry.field(STATE)?)?;
        if state.is_destroyed() {
            continue;
        }
        if !seen.insert(id) {
            return Err(SavedStateError::Invalid("duplicate routing key id"));
        }
        elements.push((RoutingKey::restore(routing, id), state));
    }
    if elements.is_empty() {
        return Err(SavedStateError::Invalid("no live back stack elements"));
    }

    let last = elements.len() - 1;
    let normalised = elements
        .into_iter()
        .enumerate()
        .map(|(i, (key, state))| {
            let want = if i == last {
                BackStackState::Active
            } else {
                BackStackState::Stashed
            };
            if state != want {
                tracing::warn!(id = key.id(), ?state, ?want, "inconsistent saved back stack state; normalised");
            }
            RoutingElement::new(key, want)
        })
        .collect();
    Ok(normalised)
}
