//! Weapon heat, spread bursts and the overheat indicator.
//!
//! A burst is allowed when the cooldown has elapsed, charge is below the
//! ceiling and the weapon is not overheated.  Every burst adds one
//! `charge_step`; charge bleeds off at `charge_decay` per second.  While
//! overheated the charge gauge keeps its last colour and the overheat
//! indicator blinks.

use super::control::{aim_direction, hull_forward};
use super::state::{
    ChargeGauge, FireOutcome, Gun, OverheatIndicator, Player, PlayerIntent, PlayerVitals,
    WeaponHeat,
};
use crate::config::TuningConfig;
use crate::feedback::{FeedbackCue, FeedbackHooks, FeedbackKind};
use crate::projectile::{spawn_projectile, ProjectileLaunch};
use crate::routine::Blinker;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;
use rand::Rng;
use std::f32::consts::TAU;

/// Unit vector in a uniformly random direction.
fn random_unit_offset(rng: &mut impl Rng) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Launch parameters for one burst of `burst_size` projectiles.
///
/// Each projectile inherits `base_velocity` and travels along
/// `aim + unit_offset / spread_divisor` scaled by the gun speed.
pub fn burst_launches(
    rng: &mut impl Rng,
    muzzle: Vec2,
    base_velocity: Vec2,
    aim: Vec2,
    gun: &Gun,
    config: &TuningConfig,
) -> Vec<ProjectileLaunch> {
    (0..config.burst_size)
        .map(|_| {
            ProjectileLaunch {
                position: muzzle,
                base_velocity,
                direction: aim + random_unit_offset(rng) / config.spread_divisor,
                speed: gun.speed,
                damage: gun.damage,
            }
        })
        .collect()
}

pub fn player_weapon_system(
    mut commands: Commands,
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    config: Res<TuningConfig>,
    mut q_player: Query<
        (
            &Transform,
            &Velocity,
            &Gun,
            &PlayerVitals,
            &mut WeaponHeat,
            &mut OverheatIndicator,
            &mut ChargeGauge,
            Option<&FeedbackHooks>,
        ),
        With<Player>,
    >,
    mut cues: MessageWriter<FeedbackCue>,
) {
    let Ok((transform, velocity, gun, vitals, mut heat, mut indicator, mut gauge, hooks)) =
        q_player.single_mut()
    else {
        return;
    };
    let dt = time.delta_secs();
    heat.tick_cooldown(dt);

    let position = transform.translation.truncate();
    if intent.fire && !vitals.dead {
        let outcome = heat.try_fire(config.fire_cooldown);
        if outcome != FireOutcome::Blocked {
            let forward = hull_forward(transform.rotation, config.facing_bias());
            // Cursor on top of the ship: shoot where the hull points.
            let aim = aim_direction(position, intent.cursor).unwrap_or(forward);
            let muzzle = position + forward * config.muzzle_offset;
            let mut rng = rand::thread_rng();
            for launch in burst_launches(&mut rng, muzzle, velocity.linvel, aim, gun, &config) {
                spawn_projectile(&mut commands, &config, &launch);
            }
            if let Some(cue) = hooks.and_then(|h| h.cue(FeedbackKind::Shoot, muzzle)) {
                cues.write(cue);
            }
            gauge.0.set_value(heat.charge);
        }
        if outcome == FireOutcome::FiredAndOverheated {
            indicator.0 = Some(Blinker::new(config.overheat_flash_interval));
            debug!("Weapon overheated");
        }
    }

    if heat.charge > 0.0 {
        heat.decay(dt);
        if heat.overheated {
            gauge.0.set_value_without_color(heat.charge);
        } else {
            gauge.0.set_value(heat.charge);
        }
    }

    if !heat.overheated {
        indicator.0 = None;
    } else if let Some(blinker) = indicator.0.as_mut() {
        blinker.tick(dt);
    }
}
