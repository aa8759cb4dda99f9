//! Vessel motion: proximity pulses, contact bounces and the minimum-speed floor.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `clear_proximity_force_system` | Update | Zero last frame's pulse force |
//! | `proximity_pulse_system`       | Update | Push away from nearby vessels every `proximity_interval` (via [`VesselGrid`]) |
//! | `vessel_contact_system`        | PostUpdate | Reflect `Heading` on solid contact |
//! | `min_speed_system`             | FixedUpdate | Double velocity below `min_speed_floor` |

use super::grid::VesselGrid;
use super::state::{Bonds, Heading, ProximityPulse, Vessel};
use crate::config::TuningConfig;
use crate::events::{ContactEvent, ContactTag};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Sum of inverse-distance repulsions acting on a vessel at `position`.
///
/// `neighbours` yields `(position, connected)` for every *other* vessel body.
/// Each one within `detection_radius` contributes `dir * k / distance` where
/// `dir` points away from the neighbour and `k` is the bonded constant only
/// when both parties are connected.
pub fn proximity_force(
    position: Vec2,
    connected: bool,
    neighbours: impl IntoIterator<Item = (Vec2, bool)>,
    config: &TuningConfig,
) -> Vec2 {
    let mut force = Vec2::ZERO;
    for (other, other_connected) in neighbours {
        let direction = position - other;
        let distance = direction.length();
        if distance > config.detection_radius || distance < f32::EPSILON {
            continue;
        }
        let k = if connected && other_connected {
            config.proximity_force_bonded
        } else {
            config.proximity_force_loose
        };
        force += direction / distance * k / distance;
    }
    force
}

pub fn clear_proximity_force_system(mut q_forces: Query<&mut ExternalForce, With<Vessel>>) {
    for mut force in q_forces.iter_mut() {
        if force.force != Vec2::ZERO {
            force.force = Vec2::ZERO;
        }
    }
}

/// Tick every vessel's [`ProximityPulse`] and apply a one-frame force when it
/// fires.
pub fn proximity_pulse_system(
    time: Res<Time>,
    config: Res<TuningConfig>,
    grid: Res<VesselGrid>,
    mut q_pulses: Query<(Entity, &mut ProximityPulse, &mut ExternalForce), With<Vessel>>,
    q_bodies: Query<(&Transform, &Bonds), With<Vessel>>,
) {
    let dt = time.delta_secs();
    for (entity, mut pulse, mut external) in q_pulses.iter_mut() {
        if !pulse.0.tick(dt) {
            continue;
        }
        pulse.0.reset(config.proximity_interval);

        let Ok((transform, bonds)) = q_bodies.get(entity) else {
            continue;
        };
        let position = transform.translation.truncate();
        let neighbours = grid
            .candidates(entity, position, config.detection_radius)
            .filter_map(|other| q_bodies.get(other).ok())
            .map(|(t, b)| (t.translation.truncate(), b.is_connected()));
        external.force = proximity_force(position, bonds.is_connected(), neighbours, &config);
    }
}

/// Bounce vessels off whatever they touch, except the player and (when both
/// are connected) other vessels.
pub fn vessel_contact_system(
    mut contacts: MessageReader<ContactEvent>,
    mut q_vessels: Query<(&mut Heading, &mut Velocity, &Bonds), With<Vessel>>,
    q_bonds: Query<&Bonds, With<Vessel>>,
) {
    for contact in contacts.read() {
        if contact.subject_tag != ContactTag::Vessel || contact.other_tag == ContactTag::Player {
            continue;
        }
        let other_connected = contact.other_tag == ContactTag::Vessel
            && q_bonds
                .get(contact.other)
                .is_ok_and(|bonds| bonds.is_connected());

        let Ok((mut heading, mut velocity, bonds)) = q_vessels.get_mut(contact.subject) else {
            continue;
        };
        if bonds.is_connected() && other_connected {
            continue;
        }
        heading.reflect(contact.normal);
        velocity.linvel = heading.0;
    }
}

/// Keep vessels from stalling: any body slower than the floor has its velocity
/// doubled each fixed step.
pub fn min_speed_system(
    config: Res<TuningConfig>,
    mut q_vessels: Query<&mut Velocity, With<Vessel>>,
) {
    for mut velocity in q_vessels.iter_mut() {
        if velocity.linvel.length() < config.min_speed_floor {
            velocity.linvel *= 2.0;
        }
    }
}
