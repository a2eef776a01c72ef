// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted walk through the onboarding carousel.
//!
//! Pages forward, steps back, saves the tree to JSON and restores it.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example onboarding`

use understory_demos::{
    Controls, OnboardingScreen, dots, finish_transitions, onboarding, visits,
};
use understory_lifecycle::State;
use understory_node::{BuildContext, Node};
use understory_routing::{SavedStateMap, Spotlight};

fn render(node: &understory_demos::Onboarding) {
    let position = node.routing_source().position().value();
    let active = node
        .routing_source()
        .active_element()
        .map(|e| e.key().routing().name())
        .unwrap_or("-");
    let controls = match Controls::for_position(&position) {
        Controls::PreviousNext {
            previous_enabled: true,
        } => "[Previous] [Next]",
        Controls::PreviousNext {
            previous_enabled: false,
        } => "           [Next]",
        Controls::CheckItOut => "[ Check it out! ]",
    };
    println!("{:<20} {}  {}", active, dots(&position), controls);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "understory_routing=debug,understory_node=debug".into()),
        )
        .init();

    let mut node = onboarding(BuildContext::root());
    node.update_lifecycle_state(State::Resumed);
    render(&node);

    while node.navigate(Spotlight::next) {
        // A renderer would acknowledge once each slide animation ends.
        finish_transitions(&mut node);
        render(&node);
    }

    println!("-- back");
    while node.handle_up_navigation() {
        finish_transitions(&mut node);
        render(&node);
        if node.routing_source().active_index() == 2 {
            break;
        }
    }

    let mut saved = SavedStateMap::new();
    node.save_instance_state(&mut saved);
    let json = serde_json::to_string_pretty(&saved)?;
    println!("-- saved\n{json}");
    node.update_lifecycle_state(State::Destroyed);

    let saved: SavedStateMap = serde_json::from_str(&json)?;
    let mut node = onboarding(BuildContext::restored(saved));
    node.update_lifecycle_state(State::Resumed);
    println!("-- restored");
    render(&node);
    println!(
        "{} visits: {:?}",
        OnboardingScreen::StatefulNode1.name(),
        visits(&node, OnboardingScreen::StatefulNode1)
    );
    Ok(())
}
