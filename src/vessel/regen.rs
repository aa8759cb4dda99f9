//! Regeneration routine for connected vessels.
//!
//! A [`Regeneration`] component is inserted when a vessel gains its first
//! bond.  It waits one interval, then heals `regen_amount` every interval while
//! the vessel stays below max HP; at full HP it re-checks every frame.  The
//! routine removes itself on the first tick after the vessel disconnects.

use super::state::{Bonds, VesselHealth};
use crate::config::TuningConfig;
use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Regeneration {
    interval: f32,
    wait: f32,
}

impl Regeneration {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            wait: interval,
        }
    }

    /// Advance by `dt`, healing `health` once per elapsed interval.
    /// Returns the number of heals applied.
    pub fn tick(&mut self, dt: f32, health: &mut VesselHealth, amount: f32) -> u32 {
        let mut heals = 0;
        self.wait -= dt;
        while self.wait <= 0.0 {
            if health.hp < health.max_hp {
                health.heal(amount);
                heals += 1;
                self.wait += self.interval;
            } else {
                // Full: poll again next frame.
                self.wait = 0.0;
                break;
            }
        }
        heals
    }

    #[inline]
    pub fn time_to_next(&self) -> f32 {
        self.wait.max(0.0)
    }
}

pub fn vessel_regeneration_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<TuningConfig>,
    mut q_regen: Query<(Entity, &mut Regeneration, &mut VesselHealth, &Bonds)>,
) {
    let dt = time.delta_secs();
    for (entity, mut regen, mut health, bonds) in q_regen.iter_mut() {
        if !bonds.is_connected() {
            commands.entity(entity).remove::<Regeneration>();
            continue;
        }
        regen.tick(dt, &mut health, config.regen_amount);
    }
}
