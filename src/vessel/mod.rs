//! Vessel module: autonomous hulls, their connection graph and population.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`]   | ECS components (`Vessel`, `VesselScale`, `VesselHealth`, `Bonds`, `Heading`, …) |
//! | [`bonds`]   | Bond rules, bond formation / severing, graph integrity check |
//! | [`grid`]    | Per-frame neighbour grid for proximity queries |
//! | [`physics`] | Proximity pulses, contact bounces, minimum-speed floor |
//! | [`regen`]   | Regeneration routine for connected vessels |
//! | [`damage`]  | Damage entry point, death delay, removal |
//!
//! ## Collider layout
//!
//! Each vessel is a dynamic body with a solid ball collider
//! (`vessel_base_radius * size`) and one sensor child, the bond zone
//! (`bond_zone_radius * size`), which only interacts with other bond zones.

pub mod bonds;
pub mod damage;
pub mod grid;
pub mod physics;
pub mod regen;
pub mod state;

pub use bonds::{evaluate_bond, BondParty, BondRejection};
pub use damage::DamageVessel;
pub use grid::VesselGrid;
pub use regen::Regeneration;
pub use state::{
    BondZone, Bonds, Dying, Heading, HullStyle, ProximityPulse, Vessel, VesselDamage,
    VesselHealth, VesselScale,
};

use crate::config::TuningConfig;
use crate::constants::HULL_STYLE_COUNT;
use crate::events::{layers, ColliderOwner, ContactTag};
use crate::feedback::FeedbackHooks;
use crate::routine::Countdown;
use crate::session::{GameState, Session};
use crate::simulation::SimSet;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

// ── Spawn ─────────────────────────────────────────────────────────────────────

/// Everything that is randomised when a vessel is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselLaunch {
    pub position: Vec2,
    pub velocity: Vec2,
    pub scale: VesselScale,
    pub hull: HullStyle,
}

impl VesselLaunch {
    /// Random position on the spawn annulus, random heading, and a speed in
    /// `[vessel_min_speed, vessel_max_speed)`.
    pub fn random(rng: &mut impl Rng, config: &TuningConfig) -> Self {
        let radius = rng.gen_range(config.spawn_radius_min..config.spawn_radius_max);
        let position = Vec2::from_angle(rng.gen_range(0.0..TAU)) * radius;
        let speed = rng.gen_range(config.vessel_min_speed..config.vessel_max_speed);
        let velocity = Vec2::from_angle(rng.gen_range(0.0..TAU)) * speed;
        let scale = rng.gen_range(config.vessel_min_scale..config.vessel_max_scale);
        Self {
            position,
            velocity,
            scale: VesselScale::uniform(scale),
            hull: HullStyle(rng.gen_range(0..HULL_STYLE_COUNT)),
        }
    }
}

/// Spawn one vessel with its bond-zone child.  Returns the body entity.
pub fn spawn_vessel(commands: &mut Commands, config: &TuningConfig, launch: &VesselLaunch) -> Entity {
    let body_radius = config.vessel_base_radius * launch.scale.size;
    let zone_radius = config.bond_zone_radius * launch.scale.size;

    let vessel = commands
        .spawn((
            Vessel,
            ContactTag::Vessel,
            launch.scale,
            launch.hull,
            VesselHealth::full(config.vessel_max_hp),
            Bonds::default(),
            Heading(launch.velocity),
            ProximityPulse::default(),
            FeedbackHooks::hurt_only(Color::srgb(1.0, 0.55, 0.2), body_radius * 2.5),
            Transform::from_translation(launch.position.extend(0.0)),
            Visibility::default(),
        ))
        .insert((
            RigidBody::Dynamic,
            Collider::ball(body_radius),
            Velocity::linear(launch.velocity),
            ExternalForce::default(),
            Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            Friction::coefficient(0.0),
            layers::vessel_body(),
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id();

    commands.entity(vessel).with_children(|parent| {
        parent.spawn((
            BondZone,
            ContactTag::BondZone,
            ColliderOwner(vessel),
            Collider::ball(zone_radius),
            Sensor,
            layers::bond_zone(),
            ActiveEvents::COLLISION_EVENTS,
            Transform::default(),
        ));
    });

    vessel
}

// ── Population ────────────────────────────────────────────────────────────────

/// Countdown to the next population top-up.
#[derive(Resource, Debug, Clone, Copy)]
pub struct VesselSpawner {
    pub next_check: Countdown,
}

impl Default for VesselSpawner {
    fn default() -> Self {
        Self {
            next_check: Countdown::new(crate::constants::VESSEL_SPAWN_INTERVAL),
        }
    }
}

/// Startup: spawn `initial_vessel_count` vessels.
pub fn spawn_initial_vessels(
    mut commands: Commands,
    config: Res<TuningConfig>,
    mut session: ResMut<Session>,
) {
    let mut rng = rand::thread_rng();
    for _ in 0..config.initial_vessel_count {
        let launch = VesselLaunch::random(&mut rng, &config);
        spawn_vessel(&mut commands, &config, &launch);
        session.increment_alive_count();
    }
    info!("Spawned {} vessels", config.initial_vessel_count);
}

/// Every `vessel_spawn_interval` seconds, top the population up to
/// `max_vessels`.
pub fn vessel_spawner_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<TuningConfig>,
    mut spawner: ResMut<VesselSpawner>,
    mut session: ResMut<Session>,
) {
    if !spawner.next_check.tick(time.delta_secs()) {
        return;
    }
    spawner.next_check.reset(config.vessel_spawn_interval);

    let deficit = config.max_vessels.saturating_sub(session.alive_vessels);
    if deficit == 0 {
        return;
    }
    let mut rng = rand::thread_rng();
    for _ in 0..deficit {
        let launch = VesselLaunch::random(&mut rng, &config);
        spawn_vessel(&mut commands, &config, &launch);
        session.increment_alive_count();
    }
    debug!("Spawner added {deficit} vessels");
}

// ── Plugins ───────────────────────────────────────────────────────────────────

/// Vessel behaviour: graph, motion, regeneration, damage.
pub struct VesselPlugin;

impl Plugin for VesselPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DamageVessel>()
            .init_resource::<VesselGrid>()
            .add_systems(
                Update,
                (
                    grid::rebuild_vessel_grid_system,
                    physics::clear_proximity_force_system,
                    physics::proximity_pulse_system,
                    regen::vessel_regeneration_system,
                    damage::vessel_death_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                FixedUpdate,
                physics::min_speed_system.run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                PostUpdate,
                (bonds::vessel_bond_system, physics::vessel_contact_system)
                    .chain()
                    .in_set(SimSet::Contacts),
            )
            .add_systems(
                PostUpdate,
                damage::vessel_damage_system.in_set(SimSet::Effects),
            )
            .add_systems(
                PostUpdate,
                bonds::link_severed_system.in_set(SimSet::Graph),
            )
            .add_systems(
                PostUpdate,
                bonds::bond_integrity_system.in_set(SimSet::Audit),
            );
    }
}

/// Initial population and periodic top-up.  Added by the binary only.
pub struct PopulationPlugin;

impl Plugin for PopulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VesselSpawner>()
            .add_systems(
                Startup,
                spawn_initial_vessels.after(crate::config::load_tuning_config),
            )
            .add_systems(
                Update,
                vessel_spawner_system.run_if(in_state(GameState::Playing)),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_launch_respects_ranges() {
        let cfg = TuningConfig::default();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let l = VesselLaunch::random(&mut rng, &cfg);
            let r = l.position.length();
            assert!(r >= cfg.spawn_radius_min - 1e-3 && r <= cfg.spawn_radius_max + 1e-3);
            let s = l.velocity.length();
            assert!(s >= cfg.vessel_min_speed - 1e-3 && s <= cfg.vessel_max_speed + 1e-3);
            assert!(l.scale.size >= cfg.vessel_min_scale && l.scale.size < cfg.vessel_max_scale);
            assert_eq!(l.scale.size, l.scale.bond_rank);
            assert!(l.hull.0 < HULL_STYLE_COUNT);
        }
    }
}
