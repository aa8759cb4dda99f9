//! Player module: vessel entity, input, weapon, defenses and upgrades.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`]    | ECS components (`Player`, `PlayerVitals`, `WeaponHeat`, `DragRamp`, …), `PlayerIntent`, messages |
//! | [`control`]  | Input → intent, thrust toward the cursor, drag ramp, aiming |
//! | [`weapon`]   | Heat, spread bursts, overheat indicator |
//! | [`combat`]   | Hazards, layered damage, invincibility flickers |
//! | [`upgrades`] | Heal / damage / speed / shield purchases |
//!
//! ## Collider layout
//!
//! The body is a solid ball that only collides with vessel hulls.  A slightly
//! larger sensor child, the hitbox, overlaps hulls and tethers and is the only
//! way the player takes damage.

pub mod combat;
pub mod control;
pub mod state;
pub mod upgrades;
pub mod weapon;

pub use state::{
    ChargeGauge, DamagePlayer, DragRamp, FireOutcome, Gun, HealthGauge, OverheatIndicator,
    Player, PlayerDamage, PlayerHitbox, PlayerIntent, PlayerUpgrade, PlayerVitals,
    ThrustEmission, Thruster, WeaponHeat,
};

use crate::config::TuningConfig;
use crate::events::{layers, ColliderOwner, ContactTag};
use crate::feedback::{FeedbackHooks, FeedbackStyle};
use crate::gauge::Gauge;
use crate::session::GameState;
use crate::simulation::SimSet;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Spawn ─────────────────────────────────────────────────────────────────────

/// Spawn the player at the origin with full health and a cold weapon.
pub fn spawn_player(commands: &mut Commands, config: &TuningConfig) -> Entity {
    let mut health = Gauge::new(Color::srgb(0.9, 0.15, 0.15), Color::srgb(0.2, 0.9, 0.3));
    health.set_max_value(config.player_max_hp);
    health.set_value(config.player_max_hp);
    let mut charge = Gauge::new(Color::srgb(0.3, 0.7, 1.0), Color::srgb(1.0, 0.3, 0.1));
    charge.set_max_value(config.max_charge);
    charge.set_value(0.0);

    let player = commands
        .spawn((
            Player,
            ContactTag::Player,
            PlayerVitals::new(config.player_max_hp),
            WeaponHeat::new(config.max_charge, config.charge_step, config.charge_decay),
            OverheatIndicator::default(),
            Gun {
                damage: config.projectile_damage,
                speed: config.projectile_speed,
            },
            Thruster {
                thrust_power: config.thrust_power,
                max_velocity: config.max_velocity,
            },
            DragRamp::default(),
            ThrustEmission::default(),
            HealthGauge(health),
            ChargeGauge(charge),
            FeedbackHooks {
                hurt: Some(FeedbackStyle {
                    color: Color::srgb(1.0, 0.2, 0.2),
                    radius: config.player_hitbox_radius * 3.0,
                }),
                shoot: Some(FeedbackStyle {
                    color: Color::srgb(1.0, 0.9, 0.5),
                    radius: 0.3,
                }),
            },
            Transform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
            Visibility::default(),
        ))
        .insert((
            RigidBody::Dynamic,
            Collider::ball(config.player_collider_radius),
            ColliderMassProperties::Mass(1.0),
            Velocity::zero(),
            ExternalForce::default(),
            Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            layers::player_body(),
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id();

    commands.entity(player).with_children(|parent| {
        parent.spawn((
            PlayerHitbox,
            ContactTag::PlayerHitbox,
            ColliderOwner(player),
            Collider::ball(config.player_hitbox_radius),
            Sensor,
            layers::player_hitbox(),
            ActiveEvents::COLLISION_EVENTS,
            Transform::default(),
        ));
    });

    info!("Player spawned at origin");
    player
}

/// Startup wrapper around [`spawn_player`].
pub fn spawn_player_system(mut commands: Commands, config: Res<TuningConfig>) {
    spawn_player(&mut commands, &config);
}

// ── Plugins ───────────────────────────────────────────────────────────────────

/// Player simulation.  Reads `PlayerIntent`; never touches input devices.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerIntent>()
            .add_message::<DamagePlayer>()
            .add_message::<PlayerUpgrade>()
            .add_systems(
                FixedUpdate,
                (control::player_thrust_system, control::player_drag_system)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    upgrades::player_upgrade_system,
                    control::player_aim_system,
                    weapon::player_weapon_system,
                    combat::player_invincibility_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                PostUpdate,
                combat::player_hazard_system.in_set(SimSet::Contacts),
            )
            .add_systems(
                PostUpdate,
                combat::player_damage_system.in_set(SimSet::Effects),
            );
    }
}

/// Keyboard and mouse → [`PlayerIntent`].  Added by the binary only.
pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            (
                control::player_intent_clear_system,
                control::keyboard_mouse_to_intent_system,
            )
                .chain()
                .after(bevy::input::InputSystems),
        );
    }
}
