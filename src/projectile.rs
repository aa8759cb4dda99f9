//! Player projectiles: spawn, lifetime and hits.
//!
//! Projectiles are kinematic sensors.  Hitting a vessel hull writes a
//! [`DamageVessel`]; hitting a tether cuts it and writes [`LinkSevered`].
//! Either way the projectile is spent.

use crate::config::TuningConfig;
use crate::events::{layers, ContactTag, OverlapEvent};
use crate::link::{Link, LinkSevered};
use crate::session::GameState;
use crate::simulation::SimSet;
use crate::vessel::DamageVessel;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub damage: f32,
    /// Seconds since launch.
    pub age: f32,
}

/// Where and how one projectile leaves the muzzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub position: Vec2,
    /// Velocity inherited from the shooter.
    pub base_velocity: Vec2,
    /// Unnormalised launch direction; spread is already folded in.
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
}

impl ProjectileLaunch {
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.base_velocity + self.direction * self.speed
    }
}

pub fn spawn_projectile(
    commands: &mut Commands,
    config: &TuningConfig,
    launch: &ProjectileLaunch,
) -> Entity {
    let velocity = launch.velocity();
    let angle = velocity.y.atan2(velocity.x) - std::f32::consts::FRAC_PI_2;
    commands
        .spawn((
            Projectile {
                damage: launch.damage,
                age: 0.0,
            },
            ContactTag::Projectile,
            Transform::from_translation(launch.position.extend(0.0))
                .with_rotation(Quat::from_rotation_z(angle)),
            Visibility::default(),
            RigidBody::KinematicVelocityBased,
            Velocity::linear(velocity),
            Collider::ball(config.projectile_collider_radius),
            Sensor,
            Ccd { enabled: true },
            layers::projectile(),
            ActiveCollisionTypes::DYNAMIC_KINEMATIC | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id()
}

pub fn projectile_lifetime_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<TuningConfig>,
    mut q_projectiles: Query<(Entity, &mut Projectile)>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile) in q_projectiles.iter_mut() {
        projectile.age += dt;
        if projectile.age >= config.projectile_lifetime {
            commands.entity(entity).despawn();
        }
    }
}

/// Resolve projectile overlaps.  Each projectile and each link is consumed at
/// most once per frame.
pub fn projectile_hit_system(
    mut commands: Commands,
    mut overlaps: MessageReader<OverlapEvent>,
    q_projectiles: Query<&Projectile>,
    q_links: Query<&Link>,
    mut damage: MessageWriter<DamageVessel>,
    mut severed: MessageWriter<LinkSevered>,
) {
    let mut spent: HashSet<Entity> = HashSet::new();
    let mut cut: HashSet<Entity> = HashSet::new();

    for overlap in overlaps.read() {
        if overlap.subject_tag != ContactTag::Projectile || spent.contains(&overlap.subject) {
            continue;
        }
        let Ok(projectile) = q_projectiles.get(overlap.subject) else {
            continue;
        };
        match overlap.other_tag {
            ContactTag::Vessel if !overlap.other_is_trigger => {
                damage.write(DamageVessel {
                    vessel: overlap.other,
                    amount: projectile.damage,
                });
            }
            ContactTag::LinkSegment => {
                let Ok(link) = q_links.get(overlap.other) else {
                    continue;
                };
                if cut.insert(overlap.other) {
                    commands.entity(overlap.other).try_despawn();
                    severed.write(LinkSevered {
                        a: link.a,
                        b: link.b,
                    });
                    debug!("Link {:?} <-> {:?} shot through", link.a, link.b);
                }
            }
            _ => continue,
        }
        spent.insert(overlap.subject);
        commands.entity(overlap.subject).try_despawn();
    }
}

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            projectile_lifetime_system.run_if(in_state(GameState::Playing)),
        )
        .add_systems(PostUpdate, projectile_hit_system.in_set(SimSet::Contacts));
    }
}
