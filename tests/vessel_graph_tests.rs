//! Headless tests for vessel bonding, tethers, damage and severing.
//!
//! These use [`MinimalPlugins`] + [`StatesPlugin`] and the full
//! `SimulationPlugin` without Rapier: collisions are injected as messages,
//! exactly as the dispatcher would produce them.
//!
//! Covered scenarios:
//! 1. Bond zones of different rank: only the higher-ranked side initiates.
//! 2. Equal ranks produce exactly one tether.
//! 3. A raw sensor `CollisionEvent` between bond zones flows through dispatch.
//! 4. Connected vessels ignore damage; loose ones die and pay out.
//! 5. A projectile through a tether severs the bond on both sides.
//! 6. A tether whose endpoint dies tears itself down.
//! 7. Solid contacts bounce loose vessels only.
//! 8. The minimum-speed floor doubles a stalling body each fixed step.
//! 9. Regeneration follows the bond set and heals on schedule.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::{CollisionEvent, Velocity};
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use flotilla::config::TuningConfig;
use flotilla::events::{ColliderOwner, ContactEvent, ContactTag, OverlapEvent};
use flotilla::link::Link;
use flotilla::projectile::{spawn_projectile, Projectile, ProjectileLaunch};
use flotilla::session::Session;
use flotilla::simulation::SimulationPlugin;
use flotilla::vessel::{
    spawn_vessel, BondZone, Bonds, DamageVessel, Dying, Heading, HullStyle, Regeneration,
    VesselHealth, VesselLaunch, VesselScale,
};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn sim_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_resource::<TuningConfig>();
    app.add_plugins(SimulationPlugin);
    app.update(); // settle into Playing
    app
}

fn spawn_test_vessel(app: &mut App, position: Vec2, size: f32) -> Entity {
    spawn_moving_vessel(app, position, Vec2::ZERO, size)
}

fn spawn_moving_vessel(app: &mut App, position: Vec2, velocity: Vec2, size: f32) -> Entity {
    let launch = VesselLaunch {
        position,
        velocity,
        scale: VesselScale::uniform(size),
        hull: HullStyle(0),
    };
    app.world_mut()
        .run_system_once(move |mut commands: Commands, config: Res<TuningConfig>| {
            spawn_vessel(&mut commands, &config, &launch)
        })
        .expect("spawn system runs")
}

/// Both directions of a bond-zone overlap, as the dispatcher writes them.
fn overlap_zones(app: &mut App, a: Entity, b: Entity) {
    for (subject, other) in [(a, b), (b, a)] {
        app.world_mut().write_message(OverlapEvent {
            subject,
            subject_tag: ContactTag::BondZone,
            other,
            other_tag: ContactTag::BondZone,
            other_is_trigger: true,
        });
    }
}

fn bonds(app: &App, vessel: Entity) -> &Bonds {
    app.world()
        .get::<Bonds>(vessel)
        .expect("vessel has a bond set")
}

fn link_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&Link>()
        .iter(app.world())
        .count()
}

fn bond_pair(app: &mut App) -> (Entity, Entity) {
    let a = spawn_test_vessel(app, Vec2::ZERO, 1.0);
    let b = spawn_test_vessel(app, Vec2::new(1.0, 0.0), 1.5);
    overlap_zones(app, a, b);
    app.update();
    (a, b)
}

fn the_link(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<Link>>()
        .single(app.world())
        .expect("one tether")
}

/// Fire a projectile straight through `link`.  Returns the projectile.
fn shoot_tether(app: &mut App, link: Entity) -> Entity {
    let projectile = app
        .world_mut()
        .run_system_once(|mut commands: Commands, config: Res<TuningConfig>| {
            spawn_projectile(
                &mut commands,
                &config,
                &ProjectileLaunch {
                    position: Vec2::new(0.5, 0.0),
                    base_velocity: Vec2::ZERO,
                    direction: Vec2::Y,
                    speed: 25.0,
                    damage: 1.0,
                },
            )
        })
        .expect("spawn system runs");

    app.world_mut().write_message(OverlapEvent {
        subject: projectile,
        subject_tag: ContactTag::Projectile,
        other: link,
        other_tag: ContactTag::LinkSegment,
        other_is_trigger: true,
    });
    projectile
}

fn touch(app: &mut App, subject: Entity, other: Entity, other_tag: ContactTag, normal: Vec2) {
    app.world_mut().write_message(ContactEvent {
        subject,
        subject_tag: ContactTag::Vessel,
        other,
        other_tag,
        normal,
    });
}

fn heading(app: &App, vessel: Entity) -> Vec2 {
    app.world().get::<Heading>(vessel).expect("vessel heading").0
}

fn velocity(app: &App, vessel: Entity) -> Vec2 {
    app.world().get::<Velocity>(vessel).expect("vessel body").linvel
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn higher_rank_initiates_single_bond() {
    let mut app = sim_app();
    let (a, b) = bond_pair(&mut app);

    assert!(bonds(&app, a).contains(b));
    assert!(bonds(&app, b).contains(a));
    assert_eq!(bonds(&app, a).len(), 1);
    assert_eq!(link_count(&mut app), 1, "exactly one tether per bond");
    assert!(app.world().get::<Regeneration>(a).is_some());
    assert!(app.world().get::<Regeneration>(b).is_some());
}

#[test]
fn equal_ranks_bond_once() {
    let mut app = sim_app();
    let a = spawn_test_vessel(&mut app, Vec2::ZERO, 1.2);
    let b = spawn_test_vessel(&mut app, Vec2::new(1.0, 0.0), 1.2);
    overlap_zones(&mut app, a, b);
    app.update();

    assert!(bonds(&app, a).contains(b));
    assert!(bonds(&app, b).contains(a));
    assert_eq!(link_count(&mut app), 1);
}

#[test]
fn sensor_collision_between_zones_bonds_the_owners() {
    let mut app = sim_app();
    let a = spawn_test_vessel(&mut app, Vec2::ZERO, 1.0);
    let b = spawn_test_vessel(&mut app, Vec2::new(1.0, 0.0), 1.5);

    let zones: Vec<(Entity, Entity)> = app
        .world_mut()
        .query_filtered::<(Entity, &ColliderOwner), With<BondZone>>()
        .iter(app.world())
        .map(|(zone, owner)| (owner.0, zone))
        .collect();
    let zone_of = |vessel: Entity| {
        zones
            .iter()
            .find(|(owner, _)| *owner == vessel)
            .map(|(_, zone)| *zone)
            .expect("every vessel has a bond zone")
    };

    app.world_mut().write_message(CollisionEvent::Started(
        zone_of(a),
        zone_of(b),
        CollisionEventFlags::SENSOR,
    ));
    app.update();

    assert!(bonds(&app, a).contains(b));
    assert!(bonds(&app, b).contains(a));
}

#[test]
fn connected_vessels_ignore_damage() {
    let mut app = sim_app();
    let (a, _) = bond_pair(&mut app);

    app.world_mut().write_message(DamageVessel {
        vessel: a,
        amount: 10.0,
    });
    app.update();

    let health = app.world().get::<VesselHealth>(a).expect("vessel alive");
    assert_eq!(health.hp, health.max_hp);
    assert!(app.world().get::<Dying>(a).is_none());
    assert_eq!(app.world().resource::<Session>().currency, 0);
}

#[test]
fn loose_vessel_dies_and_pays_out() {
    let mut app = sim_app();
    let v = spawn_test_vessel(&mut app, Vec2::ZERO, 1.0);
    let reward = app.world().resource::<TuningConfig>().kill_reward;

    app.world_mut().write_message(DamageVessel {
        vessel: v,
        amount: 1.0,
    });
    app.update();
    assert_eq!(app.world().get::<VesselHealth>(v).map(|h| h.hp), Some(2.0));

    app.world_mut().write_message(DamageVessel {
        vessel: v,
        amount: 5.0,
    });
    app.update();
    assert!(app.world().get::<Dying>(v).is_some());
    assert_eq!(app.world().resource::<Session>().currency, reward);

    // A dead vessel is not killed twice.
    app.world_mut().write_message(DamageVessel {
        vessel: v,
        amount: 5.0,
    });
    app.update();
    assert_eq!(app.world().resource::<Session>().currency, reward);
}

#[test]
fn shooting_a_tether_severs_the_bond() {
    let mut app = sim_app();
    let (a, b) = bond_pair(&mut app);
    let link = the_link(&mut app);
    let projectile = shoot_tether(&mut app, link);
    app.update();

    assert!(app.world().get_entity(link).is_err(), "tether despawned");
    assert!(app.world().get::<Projectile>(projectile).is_none());
    assert!(bonds(&app, a).is_empty());
    assert!(bonds(&app, b).is_empty());
}

#[test]
fn tether_follows_and_tears_down_with_a_dying_endpoint() {
    let mut app = sim_app();
    let (a, b) = bond_pair(&mut app);

    app.world_mut()
        .get_mut::<Transform>(b)
        .expect("vessel b")
        .translation = Vec3::new(3.0, 0.0, 0.0);
    app.update();
    let link_pos = app
        .world_mut()
        .query_filtered::<&Transform, With<Link>>()
        .single(app.world())
        .expect("tether alive")
        .translation;
    assert!((link_pos.x - 1.5).abs() < 1e-4);

    app.world_mut()
        .entity_mut(a)
        .insert(Dying(flotilla::routine::Countdown::new(10.0)));
    app.update();

    assert_eq!(link_count(&mut app), 0);
    assert!(bonds(&app, b).is_empty());
}

#[test]
fn loose_vessels_bounce_off_each_other() {
    let mut app = sim_app();
    let a = spawn_moving_vessel(&mut app, Vec2::ZERO, Vec2::new(3.0, 1.0), 1.0);
    let b = spawn_moving_vessel(&mut app, Vec2::new(1.0, 0.0), Vec2::new(-3.0, 0.0), 1.0);

    touch(&mut app, a, b, ContactTag::Vessel, Vec2::X);
    touch(&mut app, b, a, ContactTag::Vessel, Vec2::NEG_X);
    app.update();

    assert_eq!(heading(&app, a), Vec2::new(-3.0, 1.0));
    assert_eq!(velocity(&app, a), Vec2::new(-3.0, 1.0));
    assert_eq!(heading(&app, b), Vec2::new(3.0, 0.0));
    assert_eq!(velocity(&app, b), Vec2::new(3.0, 0.0));
}

#[test]
fn connected_vessels_pass_through_each_other() {
    let mut app = sim_app();
    let (a, b) = bond_pair(&mut app);
    app.world_mut()
        .get_mut::<Heading>(a)
        .expect("vessel a")
        .0 = Vec2::new(3.0, 0.0);

    touch(&mut app, a, b, ContactTag::Vessel, Vec2::X);
    app.update();

    assert_eq!(heading(&app, a), Vec2::new(3.0, 0.0));
    assert_eq!(velocity(&app, a), Vec2::ZERO, "body left alone");
}

#[test]
fn player_contact_does_not_bounce() {
    let mut app = sim_app();
    let v = spawn_moving_vessel(&mut app, Vec2::ZERO, Vec2::new(3.0, 0.0), 1.0);
    let player = app.world_mut().spawn_empty().id();

    touch(&mut app, v, player, ContactTag::Player, Vec2::X);
    app.update();

    assert_eq!(heading(&app, v), Vec2::new(3.0, 0.0));
    assert_eq!(velocity(&app, v), Vec2::new(3.0, 0.0));
}

#[test]
fn stalling_vessel_doubles_its_speed_each_fixed_step() {
    let mut app = sim_app();
    let floor = app.world().resource::<TuningConfig>().min_speed_floor;
    let slow = spawn_moving_vessel(&mut app, Vec2::ZERO, Vec2::new(floor * 0.25, 0.0), 1.0);
    let fast = spawn_moving_vessel(&mut app, Vec2::new(5.0, 0.0), Vec2::new(floor * 2.0, 0.0), 1.0);

    app.world_mut().run_schedule(FixedUpdate);
    assert_eq!(velocity(&app, slow), Vec2::new(floor * 0.5, 0.0));
    assert_eq!(velocity(&app, fast), Vec2::new(floor * 2.0, 0.0));

    app.world_mut().run_schedule(FixedUpdate);
    assert_eq!(velocity(&app, slow), Vec2::new(floor, 0.0));

    // At the floor the body is no longer stalling.
    app.world_mut().run_schedule(FixedUpdate);
    assert_eq!(velocity(&app, slow), Vec2::new(floor, 0.0));
}

#[test]
fn severed_vessel_stops_regenerating_and_restarts_on_rebond() {
    let mut app = sim_app();
    let (a, b) = bond_pair(&mut app);
    assert!(app.world().get::<Regeneration>(a).is_some());

    let link = the_link(&mut app);
    shoot_tether(&mut app, link);
    app.update(); // bond removed
    app.update(); // routine notices
    assert!(bonds(&app, a).is_empty());
    assert!(app.world().get::<Regeneration>(a).is_none());
    assert!(app.world().get::<Regeneration>(b).is_none());

    overlap_zones(&mut app, a, b);
    app.update();
    let interval = app.world().resource::<TuningConfig>().regen_interval;
    let regen = app
        .world()
        .get::<Regeneration>(a)
        .copied()
        .expect("rebond restarts regeneration");
    assert_eq!(regen.time_to_next(), interval);
}

#[test]
fn bonded_vessel_heals_back_to_full_in_two_intervals() {
    let mut app = sim_app();
    let (a, _) = bond_pair(&mut app);
    let interval = app.world().resource::<TuningConfig>().regen_interval;
    {
        let mut health = app.world_mut().get_mut::<VesselHealth>(a).expect("vessel a");
        health.hp = 1.0;
        assert_eq!(health.max_hp, 3.0);
    }

    let step = 0.25;
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        step,
    )));
    let frames_per_interval = (interval / step).round() as usize;

    for _ in 0..frames_per_interval - 1 {
        app.update();
    }
    assert_eq!(app.world().get::<VesselHealth>(a).map(|h| h.hp), Some(1.0));
    app.update();
    assert_eq!(app.world().get::<VesselHealth>(a).map(|h| h.hp), Some(2.0));

    for _ in 0..frames_per_interval {
        app.update();
    }
    assert_eq!(app.world().get::<VesselHealth>(a).map(|h| h.hp), Some(3.0));
}
