// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spotlight: a fixed carousel with a single active element.

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

const ITEMS: &str = "items";
const IDS: &str = "ids";
const ACTIVE: &str = "active";

/// Position of a spotlight element relative to the active one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpotlightState {
    /// Before the active element.
    InactiveBefore,
    /// The active element.
    Active,
    /// After the active element.
    InactiveAfter,
}

impl RoutingState for SpotlightState {
    fn is_on_screen(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl SpotlightState {
    fn for_index(index: usize, active_index: usize) -> Self {
        match index.cmp(&active_index) {
            core::cmp::Ordering::Less => Self::InactiveBefore,
            core::cmp::Ordering::Equal => Self::Active,
            core::cmp::Ordering::Greater => Self::InactiveAfter,
        }
    }
}

/// Direction of the last move of the active index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards higher indices.
    Forward,
    /// Towards lower indices.
    Backward,
}

/// Where the spotlight currently points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpotlightPosition {
    /// Index of the active element. `0` when there are no elements.
    pub active_index: usize,
    /// Number of elements.
    pub elements_count: usize,
    /// Direction of the last move, `None` until the first move.
    pub direction: Option<Direction>,
}

impl SpotlightPosition {
    /// Whether there is an element after the active one.
    pub fn has_next(&self) -> bool {
        self.active_index + 1 < self.elements_count
    }

    /// Whether there is an element before the active one.
    pub fn has_previous(&self) -> bool {
        self.active_index > 0
    }
}

/// What back navigation does on a [`Spotlight`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpotlightBackPress {
    /// Move to the previous element.
    #[default]
    Previous,
    /// Jump to the first element.
    ToFirst,
    /// Never handle back navigation.
    Disabled,
}

/// Configuration for a [`Spotlight`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotlightConfig {
    /// Back navigation behavior.
    pub back_press: SpotlightBackPress,
    /// Entry name used in the saved-state bundle.
    ///
    /// `"ChildrenState"` is reserved by `understory_node`'s `ParentNode`,
    /// which stores child bundles under it in the same map.
    pub state_key: String,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            back_press: SpotlightBackPress::default(),
            state_key: "Spotlight".into(),
        }
    }
}

/// A fixed, ordered carousel of keys with one active element.
///
/// Every key keeps its element for the lifetime of the source. Moving the
/// active index transitions the old active element to
/// [`SpotlightState::InactiveBefore`]/[`SpotlightState::InactiveAfter`] and
/// the new one to [`SpotlightState::Active`]. Moves past either end are no-ops.
///
/// Since nothing is ever removed,
/// [`on_transition_finished`](RoutingSource::on_transition_finished) only
/// settles the acknowledged element's transition.
///
/// ## Example
///
/// ```rust
/// use understory_routing::{Spotlight, SpotlightState};
///
/// let mut spotlight = Spotlight::new(vec!['A', 'B', 'C', 'D', 'E'], 0, None);
/// for _ in 0..4 {
///     spotlight.next();
/// }
/// assert_eq!(spotlight.active_index(), 4);
/// assert!(!spotlight.has_next());
/// assert!(spotlight.has_previous());
///
/// // Clamped: nothing happens.
/// assert!(!spotlight.next());
/// assert_eq!(spotlight.active_index(), 4);
/// assert_eq!(
///     spotlight.active_element().map(|e| e.state()),
///     Some(SpotlightState::Active)
/// );
/// ```
pub struct Spotlight<K> {
    config: SpotlightConfig,
    elements: StateFlow<RoutingElements<K, SpotlightState>>,
    position: StateFlow<SpotlightPosition>,
    can_handle_back_press: StateFlow<bool>,
}

impl<K: Debug> Debug for Spotlight<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Spotlight")
            .field("config", &self.config)
            .field("position", self.position.get())
            .field("elements", self.elements.get())
            .finish_non_exhaustive()
    }
}

impl<K> Spotlight<K>
where
    K: Clone + Eq + Hash + Debug + Saveable,
{
    /// Create a spotlight over `items` with `active_index` active, restoring
    /// from `saved_state` when it holds a spotlight entry.
    ///
    /// An `active_index` outside `items` is clamped.
    pub fn new(items: Vec<K>, active_index: usize, saved_state: Option<&SavedStateMap>) -> Self {
        Self::with_config(items, active_index, saved_state, SpotlightConfig::default())
    }

    /// Like [`Spotlight::new`] with an explicit configuration.
    pub fn with_config(
        items: Vec<K>,
        active_index: usize,
        saved_state: Option<&SavedStateMap>,
        config: SpotlightConfig,
    ) -> Self {
        let restored = saved_state
            .and_then(|map| map.get(config.state_key.as_str()))
            .map(restore::<K>);

        let (keys, active_index) = match restored {
            Some(Ok(restored)) => restored,
            Some(Err(error)) => {
                tracing::warn!(%error, state_key = %config.state_key, "spotlight state not restored; using defaults");
                (items.into_iter().map(RoutingKey::new).collect(), active_index)
            }
            None => (items.into_iter().map(RoutingKey::new).collect(), active_index),
        };

        let active_index = clamp_index(active_index, keys.len());
        let elements: RoutingElements<K, SpotlightState> = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| RoutingElement::new(key, SpotlightState::for_index(i, active_index)))
            .collect();
        let position = SpotlightPosition {
            active_index,
            elements_count: elements.len(),
            direction: None,
        };
        let can_back = can_go_back(config.back_press, &position);

        Self {
            config,
            elements: StateFlow::new(elements),
            position: StateFlow::new(position),
            can_handle_back_press: StateFlow::new(can_back),
        }
    }

    /// The position flow: active index, element count, last direction.
    pub fn position(&self) -> &StateFlow<SpotlightPosition> {
        &self.position
    }

    /// The active index.
    pub fn active_index(&self) -> usize {
        self.position.get().active_index
    }

    /// Number of elements.
    pub fn elements_count(&self) -> usize {
        self.position.get().elements_count
    }

    /// Whether [`Spotlight::next`] would move.
    pub fn has_next(&self) -> bool {
        self.position.get().has_next()
    }

    /// Whether [`Spotlight::previous`] would move.
    pub fn has_previous(&self) -> bool {
        self.position.get().has_previous()
    }

    /// The active element, if there are any elements.
    pub fn active_element(&self) -> Option<&RoutingElement<K, SpotlightState>> {
        self.elements.get().get(self.active_index())
    }

    /// Advance the active index by one. Returns whether it moved.
    #[allow(
        clippy::should_implement_trait,
        reason = "carousel navigation, not iteration"
    )]
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.activate(self.active_index() + 1)
    }

    /// Retreat the active index by one. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.activate(self.active_index() - 1)
    }

    /// Make the first element active.
    pub fn first(&mut self) -> bool {
        self.activate(0)
    }

    /// Make the last element active.
    pub fn last(&mut self) -> bool {
        match self.elements_count() {
            0 => false,
            n => self.activate(n - 1),
        }
    }

    /// Make `index` active. Out-of-range or already-active indices are no-ops.
    pub fn activate(&mut self, index: usize) -> bool {
        let current = *self.position.get();
        if index >= current.elements_count || index == current.active_index {
            return false;
        }

        let next: RoutingElements<K, SpotlightState> = self
            .elements
            .get()
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let target = SpotlightState::for_index(i, index);
                if element.state() == target {
                    element.clone()
                } else {
                    element.transition_to(target)
                }
            })
            .collect();

        let direction = if index > current.active_index {
            Direction::Forward
        } else {
            Direction::Backward
        };
        tracing::debug!(from = current.active_index, to = index, ?direction, "spotlight activate");

        let position = SpotlightPosition {
            active_index: index,
            elements_count: current.elements_count,
            direction: Some(direction),
        };
        self.elements.emit(next);
        self.position.emit(position);
        self.can_handle_back_press
            .emit_if_changed(can_go_back(self.config.back_press, &position));
        true
    }
}

impl<K> RoutingSource for Spotlight<K>
where
    K: Clone + Eq + Hash + Debug + Saveable,
{
    type Key = K;
    type State = SpotlightState;

    fn elements(&self) -> &StateFlow<RoutingElements<K, SpotlightState>> {
        &self.elements
    }

    fn can_handle_back_press(&self) -> &StateFlow<bool> {
        &self.can_handle_back_press
    }

    fn on_back_pressed(&mut self) {
        match self.config.back_press {
            SpotlightBackPress::Previous => {
                self.previous();
            }
            SpotlightBackPress::ToFirst => {
                self.first();
            }
            SpotlightBackPress::Disabled => {}
        }
    }

    fn on_transition_finished(&mut self, key: &RoutingKey<K>) {
        match transitions::settle(self.elements.get(), key) {
            Some(next) => self.elements.emit(next),
            None => tracing::trace!(id = key.id(), "transition already settled"),
        }
    }

    fn save_instance_state(&self, map: &mut SavedStateMap) {
        let elements = self.elements.get();
        let mut entry = SavedStateMap::new();
        entry.insert(
            ITEMS.into(),
            SavedValue::List(elements.iter().map(|e| e.key().routing().save()).collect()),
        );
        entry.insert(
            IDS.into(),
            SavedValue::List(elements.iter().map(|e| e.key().id().save()).collect()),
        );
        entry.insert(ACTIVE.into(), self.active_index().save());
        map.insert(self.config.state_key.clone(), SavedValue::Map(entry));
    }
}

fn can_go_back(back_press: SpotlightBackPress, position: &SpotlightPosition) -> bool {
    match back_press {
        SpotlightBackPress::Previous | SpotlightBackPress::ToFirst => position.has_previous(),
        SpotlightBackPress::Disabled => false,
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if index >= len {
        tracing::warn!(index, len, "active index out of bounds; clamped");
        return len - 1;
    }
    index
}

fn restore<K: Saveable>(
    value: &SavedValue,
) -> Result<(Vec<RoutingKey<K>>, usize), SavedStateError> {
    let items = Vec::<K>::restore(value.field(ITEMS)?)?;
    let raw = value.field(ACTIVE)?.as_int()?;
    let active = usize::try_from(raw).unwrap_or_else(|_| {
        tracing::warn!(index = raw, "negative active index; clamped");
        0
    });
    let ids = value
        .field(IDS)
        .ok()
        .and_then(|ids| Vec::<u64>::restore(ids).ok())
        .filter(|ids| ids.len() == items.len())
        .filter(|ids| {
            let mut seen = HashSet::with_capacity(ids.len());
            let distinct = ids.iter().all(|id| seen.insert(*id));
            if !distinct {
                tracing::warn!("duplicate routing key ids in saved spotlight; issuing fresh ids");
            }
            distinct
        });

    let keys = match ids {
        Some(ids) => items
            .into_iter()
            .zip(ids)
            .map(|(item, id)| RoutingKey::restore(item, id))
            .collect(),
        None => items.into_iter().map(RoutingKey::new).collect(),
    };
    Ok((keys, active))
}
