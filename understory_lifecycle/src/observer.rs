// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observer capabilities.

use crate::state::Event;

/// Coarse-grained lifecycle callbacks.
///
/// Every hook defaults to a no-op, so implementors only override what they
/// care about.
pub trait DefaultLifecycleObserver {
    /// Called after [`Event::OnCreate`].
    fn on_create(&mut self) {}
    /// Called after [`Event::OnStart`].
    fn on_start(&mut self) {}
    /// Called after [`Event::OnResume`].
    fn on_resume(&mut self) {}
    /// Called after [`Event::OnPause`].
    fn on_pause(&mut self) {}
    /// Called after [`Event::OnStop`].
    fn on_stop(&mut self) {}
    /// Called after [`Event::OnDestroy`].
    fn on_destroy(&mut self) {}
}

/// Receives every lifecycle [`Event`].
///
/// Implemented for any `FnMut(Event)` closure.
pub trait LifecycleEventObserver {
    /// Called for every single-step state transition.
    fn on_state_changed(&mut self, event: Event);
}

impl<F: FnMut(Event)> LifecycleEventObserver for F {
    fn on_state_changed(&mut self, event: Event) {
        self(event);
    }
}

/// An observer implementing both capabilities.
///
/// The registry calls the coarse hook first, then
/// [`LifecycleEventObserver::on_state_changed`], for each event.
pub trait FullLifecycleObserver: DefaultLifecycleObserver + LifecycleEventObserver {}

impl<T: DefaultLifecycleObserver + LifecycleEventObserver> FullLifecycleObserver for T {}

pub(crate) fn dispatch_coarse<O: DefaultLifecycleObserver + ?Sized>(observer: &mut O, event: Event) {
    match event {
        Event::OnCreate => observer.on_create(),
        Event::OnStart => observer.on_start(),
        Event::OnResume => observer.on_resume(),
        Event::OnPause => observer.on_pause(),
        Event::OnStop => observer.on_stop(),
        Event::OnDestroy => observer.on_destroy(),
    }
}
