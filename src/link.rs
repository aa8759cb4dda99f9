//! Link generator: physical tethers between bonded vessels.
//!
//! Every accepted bond writes one [`LinkRequest`].  The generator spawns a
//! [`Link`] entity carrying a kinematic capsule sensor (tag
//! [`ContactTag::LinkSegment`]) that is re-fitted between its endpoints every
//! frame.  Touching a link hurts the player; shooting it severs the bond.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `spawn_link_system`  | PostUpdate (links) | One tether per request |
//! | `link_follow_system` | PostUpdate (links) | Re-fit tethers, sever on lost endpoints |
//!
//! A link whose endpoint no longer exists, or is dying, despawns itself and
//! writes [`LinkSevered`] so both bond sets are cleaned up.

use crate::config::TuningConfig;
use crate::events::{layers, ContactTag};
use crate::simulation::SimSet;
use crate::vessel::{Dying, Vessel};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Request a tether between two newly bonded vessels.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRequest {
    pub a: Entity,
    pub b: Entity,
}

/// The bond between `a` and `b` is gone.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSevered {
    pub a: Entity,
    pub b: Entity,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub a: Entity,
    pub b: Entity,
}

/// Half-length of the capsule currently attached, so the collider is only
/// rebuilt when the span actually changes.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LinkSpan(pub f32);

/// Midpoint, rotation and capsule half-length for a tether from `a` to `b`.
/// The capsule's local Y axis is aligned with `b - a`.
pub fn link_pose(a: Vec2, b: Vec2) -> (Vec2, Quat, f32) {
    let delta = b - a;
    let half = delta.length() * 0.5;
    let angle = if delta.length_squared() > f32::EPSILON {
        delta.y.atan2(delta.x) - std::f32::consts::FRAC_PI_2
    } else {
        0.0
    };
    ((a + b) * 0.5, Quat::from_rotation_z(angle), half)
}

pub fn spawn_link_system(
    mut commands: Commands,
    mut requests: MessageReader<LinkRequest>,
    q_vessels: Query<&Transform, With<Vessel>>,
    config: Res<TuningConfig>,
) {
    for request in requests.read() {
        let (Ok(ta), Ok(tb)) = (q_vessels.get(request.a), q_vessels.get(request.b)) else {
            continue;
        };
        let (mid, rotation, half) =
            link_pose(ta.translation.truncate(), tb.translation.truncate());
        commands.spawn((
            Link {
                a: request.a,
                b: request.b,
            },
            LinkSpan(half),
            ContactTag::LinkSegment,
            Transform::from_translation(mid.extend(-0.1)).with_rotation(rotation),
            Visibility::default(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(half, config.link_radius),
            Sensor,
            layers::link(),
            ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
            ActiveEvents::COLLISION_EVENTS,
        ));
    }
}

/// Keep each tether between its endpoints; tear it down when one is gone.
pub fn link_follow_system(
    mut commands: Commands,
    mut q_links: Query<(Entity, &Link, &mut Transform, &mut Collider, &mut LinkSpan)>,
    q_vessels: Query<(&Transform, Has<Dying>), (With<Vessel>, Without<Link>)>,
    mut severed: MessageWriter<LinkSevered>,
    config: Res<TuningConfig>,
) {
    for (entity, link, mut transform, mut collider, mut span) in q_links.iter_mut() {
        let endpoints = (q_vessels.get(link.a), q_vessels.get(link.b));
        let (Ok((ta, false)), Ok((tb, false))) = endpoints else {
            commands.entity(entity).despawn();
            severed.write(LinkSevered {
                a: link.a,
                b: link.b,
            });
            continue;
        };
        let (mid, rotation, half) =
            link_pose(ta.translation.truncate(), tb.translation.truncate());
        transform.translation = mid.extend(transform.translation.z);
        transform.rotation = rotation;
        if (half - span.0).abs() > 1e-3 {
            *collider = Collider::capsule_y(half, config.link_radius);
            span.0 = half;
        }
    }
}

pub struct LinkPlugin;

impl Plugin for LinkPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<LinkRequest>()
            .add_message::<LinkSevered>()
            .add_systems(
                PostUpdate,
                (link_follow_system, spawn_link_system)
                    .chain()
                    .in_set(SimSet::Links),
            );
    }
}
