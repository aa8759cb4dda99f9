//! Vessel damage, death delay and removal.
//!
//! Damage arrives as [`DamageVessel`] messages (written by projectile hits).
//! Connected or already-dead vessels ignore it.  The killing hit credits the
//! session, plays the hurt cue and starts the [`Dying`] countdown; the vessel
//! is despawned when that countdown runs out.

use super::state::{Bonds, Dying, Vessel, VesselDamage, VesselHealth};
use crate::config::TuningConfig;
use crate::error::{SimError, SimResult};
use crate::feedback::{FeedbackCue, FeedbackHooks, FeedbackKind};
use crate::routine::Countdown;
use crate::session::Session;
use bevy::prelude::*;

/// Request to damage one vessel.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DamageVessel {
    pub vessel: Entity,
    pub amount: f32,
}

type VesselDamageQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut VesselHealth,
        &'static Bonds,
        &'static Transform,
        Option<&'static FeedbackHooks>,
    ),
    With<Vessel>,
>;

/// Apply one damage request.  A vessel that no longer exists is an error:
/// hits are only produced for live bodies.
fn apply_damage(
    q_vessels: &mut VesselDamageQuery,
    hit: &DamageVessel,
) -> SimResult<(VesselDamage, Vec2, Option<FeedbackHooks>)> {
    let (mut health, bonds, transform, hooks) =
        q_vessels
            .get_mut(hit.vessel)
            .map_err(|_| SimError::EntityNotFound {
                context: "vessel damage",
            })?;
    let outcome = health.take_damage(hit.amount, bonds.is_connected());
    Ok((outcome, transform.translation.truncate(), hooks.copied()))
}

pub fn vessel_damage_system(
    mut commands: Commands,
    mut hits: MessageReader<DamageVessel>,
    mut q_vessels: VesselDamageQuery,
    mut session: ResMut<Session>,
    mut cues: MessageWriter<FeedbackCue>,
    config: Res<TuningConfig>,
) {
    for hit in hits.read() {
        match apply_damage(&mut q_vessels, hit) {
            Ok((VesselDamage::Killed, position, hooks)) => {
                session.credit_currency(config.kill_reward);
                if let Some(cue) = hooks.and_then(|h| h.cue(FeedbackKind::Hurt, position)) {
                    cues.write(cue);
                }
                commands
                    .entity(hit.vessel)
                    .insert(Dying(Countdown::new(config.death_delay)));
                debug!("Vessel {:?} destroyed", hit.vessel);
            }
            Ok(_) => {}
            Err(e) => error!("{e}"),
        }
    }
}

/// Despawn vessels whose death delay has elapsed.
pub fn vessel_death_system(
    mut commands: Commands,
    time: Res<Time>,
    mut q_dying: Query<(Entity, &mut Dying), With<Vessel>>,
    mut session: ResMut<Session>,
) {
    let dt = time.delta_secs();
    for (entity, mut dying) in q_dying.iter_mut() {
        if dying.0.tick(dt) {
            commands.entity(entity).despawn();
            session.decrement_alive_count();
        }
    }
}
