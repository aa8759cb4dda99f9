//! Simulation plugin: frame ordering for everything that reacts to physics.
//!
//! Rapier writes back positions and emits `CollisionEvent`s in `PostUpdate`.
//! Everything that consumes them runs afterwards in this fixed order:
//!
//! | Set | Purpose |
//! |-----|---------|
//! | [`SimSet::Dispatch`] | Raw collision events → `OverlapEvent` / `ContactEvent` |
//! | [`SimSet::Contacts`] | Bonding, bounces, hazards, projectile hits |
//! | [`SimSet::Effects`]  | Damage resolution, death, game over |
//! | [`SimSet::Links`]    | Tether creation and re-fitting |
//! | [`SimSet::Graph`]    | Severed bonds, graph integrity |
//! | [`SimSet::Audit`]    | Reserved for end-of-frame checks |
//!
//! The plugin is headless.  Rendering, device input and the vessel population
//! are added by the binary so integration tests can run on `MinimalPlugins`.

use crate::events::{dispatch_collision_events_system, ContactEvent, OverlapEvent};
use crate::feedback::FeedbackPlugin;
use crate::link::LinkPlugin;
use crate::player::PlayerPlugin;
use crate::projectile::ProjectilePlugin;
use crate::session::{GameState, SessionPlugin};
use crate::vessel::VesselPlugin;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Dispatch,
    Contacts,
    Effects,
    Links,
    Graph,
    Audit,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            PostUpdate,
            (
                SimSet::Dispatch,
                SimSet::Contacts,
                SimSet::Effects,
                SimSet::Links,
                SimSet::Graph,
                SimSet::Audit,
            )
                .chain()
                .after(PhysicsSet::Writeback)
                .run_if(in_state(GameState::Playing)),
        )
        // Rapier registers this too; registering it here keeps headless apps
        // without the physics plugin working.
        .add_message::<CollisionEvent>()
        .add_message::<OverlapEvent>()
        .add_message::<ContactEvent>()
        .add_plugins((
            SessionPlugin,
            FeedbackPlugin,
            VesselPlugin,
            LinkPlugin,
            PlayerPlugin,
            ProjectilePlugin,
        ))
        .add_systems(
            PostUpdate,
            dispatch_collision_events_system.in_set(SimSet::Dispatch),
        );
    }
}
