// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered observer registry.

use alloc::boxed::Box;
use smallvec::SmallVec;

use crate::observer::{
    DefaultLifecycleObserver, FullLifecycleObserver, LifecycleEventObserver, dispatch_coarse,
};
use crate::state::{Event, State};

/// Handle returned when registering an observer; pass it to
/// [`LifecycleRegistry::remove_observer`] to unregister.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

enum Registered {
    Coarse(Box<dyn DefaultLifecycleObserver>),
    Events(Box<dyn LifecycleEventObserver>),
    Full(Box<dyn FullLifecycleObserver>),
}

impl Registered {
    fn dispatch(&mut self, event: Event) {
        match self {
            Self::Coarse(o) => dispatch_coarse(o.as_mut(), event),
            Self::Events(o) => o.on_state_changed(event),
            Self::Full(o) => {
                dispatch_coarse(o.as_mut(), event);
                o.on_state_changed(event);
            }
        }
    }
}

struct Entry {
    id: ObserverId,
    observer: Registered,
}

/// Holds the current lifecycle [`State`] and dispatches [`Event`]s to observers.
///
/// ## Ordering
///
/// - State changes are walked one step at a time, so moving from
///   `Initialized` to `Resumed` dispatches `OnCreate`, `OnStart`, `OnResume`.
/// - Upward events reach observers in registration order; downward events
///   reach them in reverse registration order, so the first observer to see a
///   node come up is the last to see it go down.
/// - An observer added after the registry has moved up is brought up to date
///   with the upward events it missed. Nobody else is notified.
/// - [`State::Destroyed`] is terminal.
pub struct LifecycleRegistry {
    state: State,
    observers: SmallVec<[Entry; 4]>,
    next_id: u64,
}

impl core::fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for LifecycleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleRegistry {
    /// Create a registry in [`State::Initialized`] with no observers.
    pub fn new() -> Self {
        Self {
            state: State::Initialized,
            observers: SmallVec::new(),
            next_id: 0,
        }
    }

    /// The current state.
    pub fn current_state(&self) -> State {
        self.state
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Register a coarse-grained observer.
    pub fn add_observer(&mut self, observer: impl DefaultLifecycleObserver + 'static) -> ObserverId {
        self.register(Registered::Coarse(Box::new(observer)))
    }

    /// Register an event observer.
    pub fn add_event_observer(
        &mut self,
        observer: impl LifecycleEventObserver + 'static,
    ) -> ObserverId {
        self.register(Registered::Events(Box::new(observer)))
    }

    /// Register an observer implementing both capabilities.
    pub fn add_full_observer(&mut self, observer: impl FullLifecycleObserver + 'static) -> ObserverId {
        self.register(Registered::Full(Box::new(observer)))
    }

    /// Unregister an observer. Returns `false` if `id` is not registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|e| e.id != id);
        self.observers.len() != before
    }

    /// Move to the state reached by `event`.
    pub fn handle_lifecycle_event(&mut self, event: Event) {
        self.set_current_state(event.target_state());
    }

    /// Move to `target`, dispatching every intermediate event.
    ///
    /// `Initialized` cannot be re-entered once left, and nothing leaves
    /// `Destroyed`. Such requests are ignored.
    pub fn set_current_state(&mut self, target: State) {
        if self.state == target {
            return;
        }
        if self.state == State::Destroyed {
            tracing::warn!(?target, "lifecycle move requested after destruction; ignored");
            return;
        }
        if target == State::Initialized {
            tracing::warn!(from = ?self.state, "cannot return to Initialized; ignored");
            return;
        }
        tracing::debug!(from = ?self.state, to = ?target, "lifecycle transition");

        while self.state < target {
            let Some(event) = Event::up_from(self.state) else {
                break;
            };
            self.state = event.target_state();
            for entry in self.observers.iter_mut() {
                entry.observer.dispatch(event);
            }
        }

        while self.state > target {
            match Event::down_from(self.state) {
                Some(event) => {
                    self.state = event.target_state();
                    for entry in self.observers.iter_mut().rev() {
                        entry.observer.dispatch(event);
                    }
                }
                // Initialized -> Destroyed never produced an OnCreate, so there
                // is nothing to tear down.
                None => self.state = target,
            }
        }
    }

    fn register(&mut self, mut observer: Registered) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;

        let mut replayed = State::Initialized;
        while replayed < self.state {
            let Some(event) = Event::up_from(replayed) else {
                break;
            };
            observer.dispatch(event);
            replayed = event.target_state();
        }

        self.observers.push(Entry { id, observer });
        id
    }
}

/// Something that owns a [`LifecycleRegistry`].
pub trait LifecycleOwner {
    /// The owner's lifecycle.
    fn lifecycle(&self) -> &LifecycleRegistry;
}

impl LifecycleOwner for LifecycleRegistry {
    fn lifecycle(&self) -> &LifecycleRegistry {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use alloc::{string::String, vec};
    use core::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Coarse {
        name: &'static str,
        log: Log,
    }

    impl Coarse {
        fn push(&self, hook: &str) {
            self.log.borrow_mut().push(alloc::format!("{}:{hook}", self.name));
        }
    }

    impl DefaultLifecycleObserver for Coarse {
        fn on_create(&mut self) {
            self.push("create");
        }
        fn on_start(&mut self) {
            self.push("start");
        }
        fn on_resume(&mut self) {
            self.push("resume");
        }
        fn on_pause(&mut self) {
            self.push("pause");
        }
        fn on_stop(&mut self) {
            self.push("stop");
        }
        fn on_destroy(&mut self) {
            self.push("destroy");
        }
    }

    struct Both(Coarse);

    impl DefaultLifecycleObserver for Both {
        fn on_start(&mut self) {
            self.0.push("start");
        }
    }

    impl LifecycleEventObserver for Both {
        fn on_state_changed(&mut self, event: Event) {
            self.0.push(&alloc::format!("{event:?}"));
        }
    }

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn walks_every_step_up_and_down() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let mut registry = LifecycleRegistry::new();
        registry.add_event_observer(move |e: Event| sink.borrow_mut().push(e));

        registry.set_current_state(State::Resumed);
        registry.set_current_state(State::Destroyed);

        assert_eq!(
            *events.borrow(),
            vec![
                Event::OnCreate,
                Event::OnStart,
                Event::OnResume,
                Event::OnPause,
                Event::OnStop,
                Event::OnDestroy,
            ]
        );
        assert_eq!(registry.current_state(), State::Destroyed);
    }

    #[test]
    fn downward_events_reach_observers_in_reverse() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        registry.add_observer(Coarse {
            name: "a",
            log: log.clone(),
        });
        registry.add_observer(Coarse {
            name: "b",
            log: log.clone(),
        });

        registry.set_current_state(State::Created);
        registry.set_current_state(State::Destroyed);

        assert_eq!(
            *log.borrow(),
            vec!["a:create", "b:create", "b:destroy", "a:destroy"]
        );
    }

    #[test]
    fn coarse_hook_runs_before_event_hook() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        registry.add_full_observer(Both(Coarse {
            name: "x",
            log: log.clone(),
        }));

        registry.set_current_state(State::Started);

        assert_eq!(
            *log.borrow(),
            vec!["x:OnCreate", "x:start", "x:OnStart"]
        );
    }

    #[test]
    fn late_observer_is_caught_up_alone() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        registry.add_observer(Coarse {
            name: "early",
            log: log.clone(),
        });
        registry.set_current_state(State::Started);
        log.borrow_mut().clear();

        registry.add_observer(Coarse {
            name: "late",
            log: log.clone(),
        });

        assert_eq!(*log.borrow(), vec!["late:create", "late:start"]);
    }

    #[test]
    fn destroyed_is_terminal() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        registry.set_current_state(State::Created);
        registry.set_current_state(State::Destroyed);
        registry.add_observer(Coarse {
            name: "a",
            log: log.clone(),
        });

        registry.set_current_state(State::Resumed);

        assert_eq!(registry.current_state(), State::Destroyed);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn initialized_is_not_reentered() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        registry.set_current_state(State::Started);
        registry.add_observer(Coarse {
            name: "a",
            log: log.clone(),
        });
        log.borrow_mut().clear();

        registry.set_current_state(State::Initialized);
        assert_eq!(registry.current_state(), State::Started);
        assert!(log.borrow().is_empty());

        registry.handle_lifecycle_event(Event::OnStop);
        registry.set_current_state(State::Initialized);
        assert_eq!(registry.current_state(), State::Created);
        assert_eq!(*log.borrow(), vec![String::from("a:stop")]);
    }

    #[test]
    fn destroying_before_create_dispatches_nothing() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        registry.add_observer(Coarse {
            name: "a",
            log: log.clone(),
        });

        registry.set_current_state(State::Destroyed);

        assert_eq!(registry.current_state(), State::Destroyed);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn handle_event_and_remove_observer() {
        let log = log();
        let mut registry = LifecycleRegistry::new();
        let id = registry.add_observer(Coarse {
            name: "a",
            log: log.clone(),
        });

        registry.handle_lifecycle_event(Event::OnCreate);
        assert!(registry.remove_observer(id));
        assert!(!registry.remove_observer(id));
        registry.handle_lifecycle_event(Event::OnStart);

        assert_eq!(registry.current_state(), State::Started);
        assert_eq!(*log.borrow(), vec!["a:create"]);
        assert_eq!(registry.observer_count(), 0);
    }
}
