// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition bookkeeping shared by routing source variants.
//!
//! These helpers operate on a snapshot and return the next snapshot, or `None`
//! when nothing changes, so a variant publishes only real changes:
//!
//! - [`settle`] applies one acknowledgement: the element's transition is
//!   collapsed onto its target state, and an element heading for a destroyed
//!   state is dropped.
//! - [`settle_all`] acknowledges every in-flight transition at once, for
//!   teardown or tests.
//!
//! Acknowledgements for different keys commute, and re-acknowledging a key is
//! a no-op.

use alloc::vec::Vec;

use crate::element::{RoutingElement, RoutingElements, RoutingState};
use crate::key::RoutingKey;

/// Acknowledge the transition of `key`.
///
/// Returns `None` if `key` is not in `elements` or its element is not
/// transitioning.
pub fn settle<K, S>(
    elements: &[RoutingElement<K, S>],
    key: &RoutingKey<K>,
) -> Option<RoutingElements<K, S>>
where
    K: Clone + PartialEq,
    S: RoutingState,
{
    let idx = elements.iter().position(|e| e.key() == key)?;
    let element = &elements[idx];
    if !element.is_transitioning() {
        return None;
    }
    let mut next = elements.to_vec();
    if element.state().is_destroyed() {
        next.remove(idx);
    } else {
        next[idx] = element.settled();
    }
    Some(next)
}

/// Acknowledge every in-flight transition.
///
/// Returns `None` if nothing was transitioning.
pub fn settle_all<K, S>(elements: &[RoutingElement<K, S>]) -> Option<RoutingElements<K, S>>
where
    K: Clone,
    S: RoutingState,
{
    if !elements.iter().any(RoutingElement::is_transitioning) {
        return None;
    }
    Some(
        elements
            .iter()
            .filter(|e| !e.state().is_destroyed())
            .map(RoutingElement::settled)
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Phase {
        Shown,
        Hidden,
        Gone,
    }

    impl RoutingState for Phase {
        fn is_on_screen(&self) -> bool {
            matches!(self, Self::Shown)
        }

        fn is_destroyed(&self) -> bool {
            matches!(self, Self::Gone)
        }
    }

    #[test]
    fn settle_collapses_or_drops() {
        let a = RoutingKey::new('a');
        let b = RoutingKey::new('b');
        let elements = vec![
            RoutingElement::transitioning(a.clone(), Phase::Hidden, Phase::Shown),
            RoutingElement::transitioning(b.clone(), Phase::Shown, Phase::Gone),
        ];

        let after_a = settle(&elements, &a).unwrap();
        assert_eq!(after_a[0], RoutingElement::new(a.clone(), Phase::Shown));
        assert_eq!(after_a.len(), 2);

        let after_b = settle(&after_a, &b).unwrap();
        assert_eq!(after_b, vec![RoutingElement::new(a.clone(), Phase::Shown)]);

        // Idempotent.
        assert!(settle(&after_b, &a).is_none());
        assert!(settle(&after_b, &b).is_none());
    }

    #[test]
    fn settle_order_does_not_matter() {
        let a = RoutingKey::new('a');
        let b = RoutingKey::new('b');
        let c = RoutingKey::new('c');
        let elements = vec![
            RoutingElement::new(a.clone(), Phase::Shown),
            RoutingElement::transitioning(b.clone(), Phase::Shown, Phase::Gone),
            RoutingElement::transitioning(c.clone(), Phase::Hidden, Phase::Gone),
        ];

        let bc = settle(&settle(&elements, &b).unwrap(), &c).unwrap();
        let cb = settle(&settle(&elements, &c).unwrap(), &b).unwrap();
        assert_eq!(bc, cb);
        assert_eq!(settle_all(&elements), Some(bc));
    }

    #[test]
    fn settle_all_on_settled_is_none() {
        let elements = vec![RoutingElement::new(RoutingKey::new('a'), Phase::Hidden)];
        assert!(settle_all(&elements).is_none());
    }
}
