//! Player hazards, damage and invincibility.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `player_hazard_system` | PostUpdate (contacts) | Hitbox touching a hull or a link → [`DamagePlayer`] |
//! | `player_damage_system` | PostUpdate (effects)  | Layered damage, hurt cue, health gauge, game over |
//! | `player_invincibility_system` | Update | Advance both invincibility flickers |

use super::state::{DamagePlayer, HealthGauge, Player, PlayerDamage, PlayerVitals};
use crate::config::TuningConfig;
use crate::events::{ContactTag, OverlapEvent};
use crate::feedback::{FeedbackCue, FeedbackHooks, FeedbackKind};
use crate::session::GameOverReported;
use bevy::prelude::*;

/// Whether an overlap on the player hitbox is harmful.  Solid vessel hulls and
/// tether segments hurt; bond zones and projectiles never do.
pub fn is_hazard(overlap: &OverlapEvent) -> bool {
    overlap.subject_tag == ContactTag::PlayerHitbox
        && match overlap.other_tag {
            ContactTag::Vessel => !overlap.other_is_trigger,
            ContactTag::LinkSegment => true,
            _ => false,
        }
}

pub fn player_hazard_system(
    mut overlaps: MessageReader<OverlapEvent>,
    config: Res<TuningConfig>,
    mut damage: MessageWriter<DamagePlayer>,
) {
    for overlap in overlaps.read() {
        if is_hazard(overlap) {
            damage.write(DamagePlayer {
                amount: config.hazard_damage,
            });
        }
    }
}

pub fn player_damage_system(
    mut hits: MessageReader<DamagePlayer>,
    config: Res<TuningConfig>,
    mut q_player: Query<
        (
            &Transform,
            &mut PlayerVitals,
            &mut HealthGauge,
            Option<&FeedbackHooks>,
        ),
        With<Player>,
    >,
    mut cues: MessageWriter<FeedbackCue>,
    mut game_over: MessageWriter<GameOverReported>,
) {
    let Ok((transform, mut vitals, mut gauge, hooks)) = q_player.single_mut() else {
        hits.clear();
        return;
    };
    let position = transform.translation.truncate();

    for hit in hits.read() {
        let outcome = vitals.take_damage(
            hit.amount,
            config.invincibility_duration,
            config.invincibility_blink_interval,
        );
        match outcome {
            PlayerDamage::Ignored => continue,
            PlayerDamage::Killed => {
                info!("Player destroyed");
                game_over.write(GameOverReported);
                continue;
            }
            PlayerDamage::ShieldAbsorbed => {
                debug!("Shield absorbed hit, {} charges left", vitals.shield_charges);
            }
            PlayerDamage::Hurt => {
                gauge.0.set_value(vitals.hp);
            }
        }
        if let Some(cue) = hooks.and_then(|h| h.cue(FeedbackKind::Hurt, position)) {
            cues.write(cue);
        }
    }
}

pub fn player_invincibility_system(
    time: Res<Time>,
    mut q_player: Query<&mut PlayerVitals, With<Player>>,
) {
    let dt = time.delta_secs();
    for mut vitals in q_player.iter_mut() {
        if vitals.temporary.is_some() || vitals.shield.is_some() {
            vitals.tick(dt);
        }
    }
}
