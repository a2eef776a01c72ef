// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A hot, replay-of-one observable value.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::{Cell, RefCell};
use smallvec::SmallVec;

/// Handle returned by [`StateFlow::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&Arc<T>)>;

/// An always-current value with synchronous, ordered change notification.
///
/// - [`StateFlow::subscribe`] delivers the current value to the new observer
///   before returning, and never any older value.
/// - [`StateFlow::emit`] publishes a new value and delivers it to every
///   current observer before returning, so observers see values in emission
///   order.
/// - Values are shared as [`Arc`] snapshots. Observers can hand them to another
///   thread (for example a render thread) but cannot mutate them.
///
/// Subscribing only needs `&self`. Emitting needs `&mut self`, so only the
/// owner of a flow can publish, and observers cannot publish re-entrantly.
pub struct StateFlow<T> {
    value: Arc<T>,
    observers: RefCell<SmallVec<[(SubscriptionId, Observer<T>); 2]>>,
    next_id: Cell<u64>,
}

impl<T: core::fmt::Debug> core::fmt::Debug for StateFlow<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateFlow")
            .field("value", &self.value)
            .field("subscribers", &self.observers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: Default> Default for StateFlow<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> StateFlow<T> {
    /// Create a flow holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
            observers: RefCell::new(SmallVec::new()),
            next_id: Cell::new(0),
        }
    }

    /// The current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// A shared snapshot of the current value.
    pub fn value(&self) -> Arc<T> {
        self.value.clone()
    }

    /// Register `observer`. It is called with the current value immediately
    /// and with every value emitted afterwards.
    pub fn subscribe(&self, observer: impl FnMut(&Arc<T>) + 'static) -> SubscriptionId {
        let mut observer: Observer<T> = Box::new(observer);
        observer(&self.value);

        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    /// Remove an observer. Returns `false` if `id` is not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(i, _)| *i != id);
        observers.len() != before
    }

    /// Number of current observers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Publish `value` to every observer.
    pub fn emit(&mut self, value: T) {
        self.value = Arc::new(value);
        tracing::trace!(subscribers = self.observers.get_mut().len(), "emit");
        for (_, observer) in self.observers.get_mut().iter_mut() {
            observer(&self.value);
        }
    }

    /// Publish `value` only if it differs from the current one.
    ///
    /// Returns whether anything was emitted.
    pub fn emit_if_changed(&mut self, value: T) -> bool
    where
        T: PartialEq,
    {
        if *self.value == value {
            return false;
        }
        self.emit(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;

    fn recorder(flow: &StateFlow<u32>) -> (SubscriptionId, Rc<RefCell<Vec<u32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = flow.subscribe(move |v| sink.borrow_mut().push(**v));
        (id, seen)
    }

    #[test]
    fn late_subscriber_sees_latest_only() {
        let mut flow = StateFlow::new(1_u32);
        flow.emit(2);
        flow.emit(3);

        let (_, seen) = recorder(&flow);
        flow.emit(4);

        assert_eq!(*seen.borrow(), vec![3, 4]);
    }

    #[test]
    fn every_observer_sees_every_emission_in_order() {
        let mut flow = StateFlow::new(0_u32);
        let (_, a) = recorder(&flow);
        let (_, b) = recorder(&flow);

        for v in 1..=3 {
            flow.emit(v);
        }

        assert_eq!(*a.borrow(), vec![0, 1, 2, 3]);
        assert_eq!(*b.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut flow = StateFlow::new(0_u32);
        let (id, seen) = recorder(&flow);

        assert!(flow.unsubscribe(id));
        assert!(!flow.unsubscribe(id));
        flow.emit(1);

        assert_eq!(*seen.borrow(), vec![0]);
        assert_eq!(flow.subscriber_count(), 0);
    }

    #[test]
    fn emit_if_changed_skips_equal_values() {
        let mut flow = StateFlow::new(5_u32);
        let (_, seen) = recorder(&flow);

        assert!(!flow.emit_if_changed(5));
        assert!(flow.emit_if_changed(6));

        assert_eq!(*seen.borrow(), vec![5, 6]);
        assert_eq!(*flow.get(), 6);
    }

    #[test]
    fn snapshots_outlive_later_emissions() {
        let mut flow = StateFlow::new(vec![1_u32]);
        let before = flow.value();
        flow.emit(vec![1, 2]);

        assert_eq!(*before, vec![1]);
        assert_eq!(*flow.value(), vec![1, 2]);
    }
}
