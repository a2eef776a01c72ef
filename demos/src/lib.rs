// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared pieces for the Understory navigation demos.
//!
//! The onboarding flow is a five-screen carousel driven by a
//! [`Spotlight`]. Two of the screens count how often they were resumed and
//! keep that count across save and restore.
//!
//! Run:
//! - `cargo run -p understory_demos --example onboarding`

use understory_lifecycle::{LifecycleOwner, LifecycleRegistry, State};
use understory_node::{BuildContext, LeafNode, Node, ParentNode};
use understory_routing::{
    RoutingKey, RoutingSource, Saveable, SavedStateError, SavedStateMap, SavedValue, Spotlight,
    SpotlightPosition,
};

/// Screens of the onboarding carousel, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OnboardingScreen {
    /// Welcome screen.
    IntroScreen,
    /// Explains the node tree.
    ApplicationTree,
    /// First stateful screen.
    StatefulNode1,
    /// Second stateful screen.
    StatefulNode2,
    /// Teaser for routing sources.
    RoutingSourceTeaser,
}

impl OnboardingScreen {
    /// Every screen, in carousel order.
    pub const ALL: [Self; 5] = [
        Self::IntroScreen,
        Self::ApplicationTree,
        Self::StatefulNode1,
        Self::StatefulNode2,
        Self::RoutingSourceTeaser,
    ];

    /// Stable name, used for display and saved state.
    pub fn name(self) -> &'static str {
        match self {
            Self::IntroScreen => "IntroScreen",
            Self::ApplicationTree => "ApplicationTree",
            Self::StatefulNode1 => "StatefulNode1",
            Self::StatefulNode2 => "StatefulNode2",
            Self::RoutingSourceTeaser => "RoutingSourceTeaser",
        }
    }
}

impl Saveable for OnboardingScreen {
    fn save(&self) -> SavedValue {
        SavedValue::Str(self.name().into())
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        let name = value.as_str()?;
        Self::ALL
            .into_iter()
            .find(|screen| screen.name() == name)
            .ok_or_else(|| SavedStateError::UnknownVariant(name.into()))
    }
}

const VISITS: &str = "visits";

/// A screen that counts how many times it reached [`State::Resumed`].
#[derive(Debug)]
pub struct VisitCounter {
    lifecycle: LifecycleRegistry,
    visits: i64,
}

impl VisitCounter {
    /// Create a counter, restoring its count from `ctx`.
    pub fn new(ctx: BuildContext) -> Self {
        let visits = match ctx.saved_state().and_then(|map| map.get(VISITS)) {
            Some(value) => i64::restore(value).unwrap_or_else(|error| {
                tracing::warn!(%error, "visit count not restored");
                0
            }),
            None => 0,
        };
        Self {
            lifecycle: LifecycleRegistry::new(),
            visits,
        }
    }

    /// Number of times this screen was resumed.
    pub fn visits(&self) -> i64 {
        self.visits
    }
}

impl LifecycleOwner for VisitCounter {
    fn lifecycle(&self) -> &LifecycleRegistry {
        &self.lifecycle
    }
}

impl Node for VisitCounter {
    fn lifecycle_mut(&mut self) -> &mut LifecycleRegistry {
        &mut self.lifecycle
    }

    fn update_lifecycle_state(&mut self, state: State) {
        let was = self.lifecycle.current_state();
        self.lifecycle.set_current_state(state);
        if was < State::Resumed && self.lifecycle.current_state() == State::Resumed {
            self.visits += 1;
            tracing::debug!(visits = self.visits, "screen resumed");
        }
    }

    fn save_instance_state(&self, map: &mut SavedStateMap) {
        map.insert(VISITS.into(), self.visits.save());
    }
}

fn resolve_screen(screen: &OnboardingScreen, ctx: BuildContext) -> Box<dyn Node> {
    match screen {
        OnboardingScreen::IntroScreen
        | OnboardingScreen::ApplicationTree
        | OnboardingScreen::RoutingSourceTeaser => Box::new(LeafNode::new(ctx)),
        OnboardingScreen::StatefulNode1 | OnboardingScreen::StatefulNode2 => {
            Box::new(VisitCounter::new(ctx))
        }
    }
}

/// The onboarding container node.
pub type Onboarding = ParentNode<Spotlight<OnboardingScreen>>;

/// Build the onboarding carousel, restoring from `ctx` when it carries state.
pub fn onboarding(ctx: BuildContext) -> Onboarding {
    ParentNode::new(
        ctx,
        |saved| Spotlight::new(OnboardingScreen::ALL.to_vec(), 0, saved),
        resolve_screen,
    )
}

/// Visit count of `screen`, if its node is alive and counts visits.
pub fn visits(onboarding: &Onboarding, screen: OnboardingScreen) -> Option<i64> {
    let key = key_of(onboarding, screen)?;
    let mut saved = SavedStateMap::new();
    onboarding.child(&key)?.save_instance_state(&mut saved);
    saved.get(VISITS).and_then(|v| v.as_int().ok())
}

/// Routing key of `screen` in the carousel.
pub fn key_of(
    onboarding: &Onboarding,
    screen: OnboardingScreen,
) -> Option<RoutingKey<OnboardingScreen>> {
    onboarding
        .routing_source()
        .elements()
        .get()
        .iter()
        .find(|e| *e.key().routing() == screen)
        .map(|e| e.key().clone())
}

/// Acknowledge every in-flight transition, as a renderer would once its
/// animations end.
pub fn finish_transitions(onboarding: &mut Onboarding) {
    let transitioning: Vec<_> = onboarding
        .routing_source()
        .elements()
        .get()
        .iter()
        .filter(|e| e.is_transitioning())
        .map(|e| e.key().clone())
        .collect();
    for key in &transitioning {
        onboarding.on_transition_finished(key);
    }
}

/// Page indicator: one dot per screen, the active one filled.
pub fn dots(position: &SpotlightPosition) -> String {
    (0..position.elements_count)
        .map(|i| if i == position.active_index { '●' } else { '○' })
        .collect()
}

/// Button row under the carousel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Controls {
    /// "Previous" and "Next" buttons.
    PreviousNext {
        /// Whether "Previous" is enabled.
        previous_enabled: bool,
    },
    /// The final "Check it out!" button.
    CheckItOut,
}

impl Controls {
    /// Controls for the given carousel position.
    pub fn for_position(position: &SpotlightPosition) -> Self {
        if position.has_next() {
            Self::PreviousNext {
                previous_enabled: position.has_previous(),
            }
        } else {
            Self::CheckItOut
        }
    }
}
