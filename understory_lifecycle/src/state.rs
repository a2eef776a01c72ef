// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle states and the events that move between them.

/// Lifecycle state of a node.
///
/// States are ordered: `Destroyed < Initialized < Created < Started < Resumed`.
/// Comparing states is how hosts cap a child's lifecycle against its parent's,
/// e.g. `parent_state.min(State::Created)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// Terminal state. No further events are dispatched.
    Destroyed,
    /// Constructed but not yet created.
    Initialized,
    /// Created, not visible.
    Created,
    /// Visible, not interactive.
    Started,
    /// Visible and interactive.
    Resumed,
}

impl State {
    /// Whether this state is at least as far along as `other`.
    pub fn is_at_least(self, other: Self) -> bool {
        self >= other
    }
}

/// A single step between two adjacent [`State`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// `Initialized -> Created`.
    OnCreate,
    /// `Created -> Started`.
    OnStart,
    /// `Started -> Resumed`.
    OnResume,
    /// `Resumed -> Started`.
    OnPause,
    /// `Started -> Created`.
    OnStop,
    /// `Created -> Destroyed`.
    OnDestroy,
}

impl Event {
    /// The event that moves one step up from `state`, if any.
    pub fn up_from(state: State) -> Option<Self> {
        match state {
            State::Initialized => Some(Self::OnCreate),
            State::Created => Some(Self::OnStart),
            State::Started => Some(Self::OnResume),
            State::Resumed | State::Destroyed => None,
        }
    }

    /// The event that moves one step down from `state`, if any.
    pub fn down_from(state: State) -> Option<Self> {
        match state {
            State::Created => Some(Self::OnDestroy),
            State::Started => Some(Self::OnStop),
            State::Resumed => Some(Self::OnPause),
            State::Initialized | State::Destroyed => None,
        }
    }

    /// The state reached after this event.
    pub fn target_state(self) -> State {
        match self {
            Self::OnCreate | Self::OnStop => State::Created,
            Self::OnStart | Self::OnPause => State::Started,
            Self::OnResume => State::Resumed,
            Self::OnDestroy => State::Destroyed,
        }
    }

    /// Whether this event moves towards [`State::Resumed`].
    pub fn is_upward(self) -> bool {
        matches!(self, Self::OnCreate | Self::OnStart | Self::OnResume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_ordered() {
        assert!(State::Destroyed < State::Initialized);
        assert!(State::Initialized < State::Created);
        assert!(State::Created < State::Started);
        assert!(State::Started < State::Resumed);
        assert_eq!(State::Resumed.min(State::Created), State::Created);
        assert!(State::Started.is_at_least(State::Created));
        assert!(!State::Created.is_at_least(State::Started));
    }

    #[test]
    fn up_and_down_are_inverse_steps() {
        let mut state = State::Initialized;
        while let Some(event) = Event::up_from(state) {
            assert!(event.is_upward(), "{event:?} should move up");
            state = event.target_state();
        }
        assert_eq!(state, State::Resumed);

        while let Some(event) = Event::down_from(state) {
            assert!(!event.is_upward(), "{event:?} should move down");
            state = event.target_state();
        }
        assert_eq!(state, State::Destroyed);
    }

    #[test]
    fn no_events_out_of_terminal_states() {
        assert_eq!(Event::up_from(State::Destroyed), None);
        assert_eq!(Event::down_from(State::Destroyed), None);
        assert_eq!(Event::up_from(State::Resumed), None);
        assert_eq!(Event::down_from(State::Initialized), None);
    }
}
