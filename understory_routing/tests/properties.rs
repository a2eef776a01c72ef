// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the routing source variants.

use proptest::prelude::*;
use understory_routing::{
    BackStack, BackStackState, RoutingElement, RoutingKey, RoutingSource, SavedStateMap,
    Spotlight, SpotlightState, transitions,
};

#[derive(Clone, Debug)]
enum SpotlightOp {
    Next,
    Previous,
    First,
    Last,
    Activate(usize),
    Back,
}

fn spotlight_op() -> impl Strategy<Value = SpotlightOp> {
    prop_oneof![
        3 => Just(SpotlightOp::Next),
        3 => Just(SpotlightOp::Previous),
        1 => Just(SpotlightOp::First),
        1 => Just(SpotlightOp::Last),
        1 => (0_usize..12).prop_map(SpotlightOp::Activate),
        2 => Just(SpotlightOp::Back),
    ]
}

#[derive(Clone, Debug)]
enum StackOp {
    Push(u8),
    Pop,
    Replace(u8),
    NewRoot(u8),
    SingleTop(u8),
    Back,
    /// Acknowledge the n-th element of the current snapshot, modulo its length.
    Ack(usize),
}

fn stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        4 => (0_u8..5).prop_map(StackOp::Push),
        3 => Just(StackOp::Pop),
        1 => (0_u8..5).prop_map(StackOp::Replace),
        1 => (0_u8..5).prop_map(StackOp::NewRoot),
        1 => (0_u8..5).prop_map(StackOp::SingleTop),
        2 => Just(StackOp::Back),
        3 => any::<usize>().prop_map(StackOp::Ack),
    ]
}

fn apply_stack(stack: &mut BackStack<u32>, op: &StackOp) {
    match *op {
        StackOp::Push(r) => stack.push(u32::from(r)),
        StackOp::Pop => {
            stack.pop();
        }
        StackOp::Replace(r) => stack.replace(u32::from(r)),
        StackOp::NewRoot(r) => {
            stack.new_root(u32::from(r));
        }
        StackOp::SingleTop(r) => {
            stack.single_top(u32::from(r));
        }
        StackOp::Back => stack.on_back_pressed(),
        StackOp::Ack(n) => {
            let elements = stack.elements().value();
            if !elements.is_empty() {
                let key = elements[n % elements.len()].key().clone();
                stack.on_transition_finished(&key);
            }
        }
    }
}

fn ack_in_order<'a>(
    snapshot: &[RoutingElement<u32, BackStackState>],
    order: impl Iterator<Item = &'a RoutingKey<u32>>,
) -> Vec<RoutingElement<u32, BackStackState>> {
    let mut elements = snapshot.to_vec();
    for key in order {
        if let Some(next) = transitions::settle(&elements, key) {
            elements = next;
        }
        assert!(
            transitions::settle(&elements, key).is_none(),
            "second acknowledgement of {key:?} changed the snapshot"
        );
    }
    elements
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn spotlight_position_stays_consistent(
        count in 1_usize..8,
        start in 0_usize..10,
        ops in prop::collection::vec(spotlight_op(), 0..40),
    ) {
        let mut spotlight = Spotlight::new((0..count).collect(), start, None);

        for op in &ops {
            match *op {
                SpotlightOp::Next => { spotlight.next(); }
                SpotlightOp::Previous => { spotlight.previous(); }
                SpotlightOp::First => { spotlight.first(); }
                SpotlightOp::Last => { spotlight.last(); }
                SpotlightOp::Activate(i) => { spotlight.activate(i); }
                SpotlightOp::Back => spotlight.on_back_pressed(),
            }

            let index = spotlight.active_index();
            prop_assert!(index < count, "active index {} out of {}", index, count);
            prop_assert_eq!(spotlight.has_next(), index + 1 < count);
            prop_assert_eq!(spotlight.has_previous(), index > 0);
            prop_assert_eq!(*spotlight.can_handle_back_press().get(), index > 0);

            let position = spotlight.position().value();
            prop_assert_eq!(position.active_index, index);
            prop_assert_eq!(position.elements_count, count);

            let active = spotlight
                .elements()
                .get()
                .iter()
                .filter(|e| e.state() == SpotlightState::Active)
                .count();
            prop_assert_eq!(active, 1);
        }
    }

    #[test]
    fn up_navigation_matches_back_flag(
        count in 1_usize..6,
        start in 0_usize..6,
        pushes in prop::collection::vec(0_u8..5, 0..5),
    ) {
        let mut spotlight = Spotlight::new((0..count).collect(), start, None);
        let expected = *spotlight.can_handle_back_press().get();
        let before = spotlight.active_index();
        prop_assert_eq!(spotlight.handle_up_navigation(), expected);
        prop_assert_eq!(spotlight.active_index() != before, expected);

        let mut stack = BackStack::new(0_u32, None);
        for r in &pushes {
            stack.push(u32::from(*r));
        }
        let expected = *stack.can_handle_back_press().get();
        let len = stack.len();
        prop_assert_eq!(stack.handle_up_navigation(), expected);
        prop_assert_eq!(stack.len(), if expected { len - 1 } else { len });
    }

    #[test]
    fn back_stack_keeps_one_active_element(
        ops in prop::collection::vec(stack_op(), 0..60),
    ) {
        let mut stack = BackStack::new(0_u32, None);

        for op in &ops {
            apply_stack(&mut stack, op);

            let elements = stack.elements().value();
            let active = elements.iter().filter(|e| e.state() == BackStackState::Active).count();
            let live = elements.iter().filter(|e| !e.is_pending_destruction()).count();
            let pending = elements.len() - live;

            prop_assert_eq!(active, 1, "{:?}", elements);
            prop_assert_eq!(stack.len(), live);
            prop_assert_eq!(stack.pending_destructions(), pending);
            prop_assert_eq!(*stack.can_handle_back_press().get(), live > 1);
            prop_assert_eq!(
                elements.iter().rposition(|e| e.state() == BackStackState::Active)
                    .map(|i| elements[i].key().clone()),
                stack.active_key()
            );
        }
    }

    #[test]
    fn acknowledgements_commute_and_repeat_harmlessly(
        ops in prop::collection::vec(stack_op(), 0..40),
    ) {
        let mut stack = BackStack::new(0_u32, None);
        for op in &ops {
            apply_stack(&mut stack, op);
        }
        let snapshot = stack.elements().value();
        let keys: Vec<RoutingKey<u32>> = snapshot
            .iter()
            .filter(|e| e.is_transitioning())
            .map(|e| e.key().clone())
            .collect();

        let forward = ack_in_order(&snapshot, keys.iter());
        let backward = ack_in_order(&snapshot, keys.iter().rev());
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(
            forward,
            transitions::settle_all(&snapshot).unwrap_or_else(|| snapshot.to_vec())
        );
    }

    #[test]
    fn spotlight_restores_after_moves(
        count in 1_usize..8,
        moves in 0_usize..10,
    ) {
        let items: Vec<char> = ('a'..='z').take(count).collect();
        let mut spotlight = Spotlight::new(items.clone(), 0, None);
        for _ in 0..moves {
            spotlight.next();
        }

        let mut map = SavedStateMap::new();
        spotlight.save_instance_state(&mut map);
        let restored = Spotlight::new(items, 0, Some(&map));

        prop_assert_eq!(restored.active_index(), moves.min(count - 1));
        prop_assert_eq!(restored.has_previous(), spotlight.has_previous());
        prop_assert_eq!(restored.has_next(), spotlight.has_next());
    }

    #[test]
    fn back_stack_restores_live_elements(
        ops in prop::collection::vec(stack_op(), 0..40),
    ) {
        let mut stack = BackStack::new(0_u32, None);
        for op in &ops {
            apply_stack(&mut stack, op);
        }

        let mut map = SavedStateMap::new();
        stack.save_instance_state(&mut map);
        let restored = BackStack::new(99_u32, Some(&map));

        let live: Vec<RoutingKey<u32>> = stack
            .elements()
            .get()
            .iter()
            .filter(|e| !e.is_pending_destruction())
            .map(|e| e.key().clone())
            .collect();
        let keys: Vec<RoutingKey<u32>> = restored.elements().get().iter().map(|e| e.key().clone()).collect();
        prop_assert_eq!(keys, live);
        prop_assert_eq!(restored.active_key(), stack.active_key());
        prop_assert_eq!(restored.pending_destructions(), 0);
    }
}
