//! Player components, resources and messages.
//!
//! All ECS state that describes the player vessel lives here.  The timed
//! parts (invincibility flicker, weapon heat, overheat blink, drag ramp) are
//! plain structs advanced with a frame delta so they can be driven directly in
//! unit tests.  Systems that mutate this state are in the sibling modules:
//! - [`super::control`] — input, thrust, drag ramp, aiming
//! - [`super::weapon`] — heat, bursts, overheat indicator
//! - [`super::combat`] — hazards, damage, invincibility
//! - [`super::upgrades`] — purchased upgrades

use crate::constants::{
    CHARGE_DECAY, CHARGE_STEP, MAX_CHARGE, MAX_VELOCITY, PLAYER_MAX_HP, PROJECTILE_DAMAGE,
    PROJECTILE_SPEED, THRUST_POWER,
};
use crate::gauge::Gauge;
use crate::routine::{Blinker, Flicker};
use bevy::prelude::*;

// ── Markers ───────────────────────────────────────────────────────────────────

/// Marker component for the player vessel body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player;

/// Marker for the hazard sensor child of the player.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHitbox;

// ── Vitals ────────────────────────────────────────────────────────────────────

/// Outcome of a damage call on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerDamage {
    /// Dead or invincible; nothing changed.
    Ignored,
    /// A shield charge took the hit.
    ShieldAbsorbed,
    Hurt,
    /// This call performed the death transition.
    Killed,
}

/// Health, shield and the two independent invincibility flickers.
///
/// `temporary` runs after a hit to the hull; `shield` runs after a shield
/// charge absorbs a hit.  While either is present the player ignores damage.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerVitals {
    pub hp: f32,
    pub max_hp: f32,
    pub shield_charges: u32,
    /// Whether the shield outline is active at all.
    pub shield_visual: bool,
    pub dead: bool,
    pub temporary: Option<Flicker>,
    pub shield: Option<Flicker>,
}

impl Default for PlayerVitals {
    fn default() -> Self {
        Self::new(PLAYER_MAX_HP)
    }
}

impl PlayerVitals {
    pub fn new(max_hp: f32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            shield_charges: 0,
            shield_visual: false,
            dead: false,
            temporary: None,
            shield: None,
        }
    }

    #[inline]
    pub fn is_temporarily_invincible(&self) -> bool {
        self.temporary.is_some()
    }

    #[inline]
    pub fn is_shield_invincible(&self) -> bool {
        self.shield.is_some()
    }

    #[inline]
    pub fn has_shield(&self) -> bool {
        self.shield_charges > 0
    }

    /// Layered damage: invincibility, then shield, then hull.
    ///
    /// `flicker_duration` / `flicker_interval` configure whichever
    /// invincibility flicker the hit starts.
    pub fn take_damage(
        &mut self,
        amount: f32,
        flicker_duration: f32,
        flicker_interval: f32,
    ) -> PlayerDamage {
        if self.dead || self.is_temporarily_invincible() || self.is_shield_invincible() {
            return PlayerDamage::Ignored;
        }

        if self.has_shield() {
            self.shield_charges -= 1;
            self.shield = Some(Flicker::new(flicker_duration, flicker_interval));
            return PlayerDamage::ShieldAbsorbed;
        }

        self.hp -= amount;
        if self.hp <= 0.0 {
            self.dead = true;
            return PlayerDamage::Killed;
        }
        self.temporary = Some(Flicker::new(flicker_duration, flicker_interval));
        PlayerDamage::Hurt
    }

    /// Advance both flickers.  A finished shield flicker hides the shield
    /// outline when no charges remain.
    pub fn tick(&mut self, dt: f32) {
        if let Some(flicker) = self.temporary.as_mut() {
            if flicker.tick(dt) {
                self.temporary = None;
            }
        }
        if let Some(flicker) = self.shield.as_mut() {
            if flicker.tick(dt) {
                self.shield = None;
                if !self.has_shield() {
                    self.shield_visual = false;
                }
            }
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if self.dead {
            return;
        }
        self.hp = (self.hp + amount).clamp(0.0, self.max_hp);
    }

    pub fn grant_shield(&mut self, charges: u32) {
        self.shield_charges = charges;
        self.shield_visual = true;
    }

    /// Hull blink state of the temporary flicker.
    pub fn hull_hidden(&self) -> bool {
        self.temporary.is_some_and(|f| f.hidden())
    }

    /// Whether the shield outline should be drawn this frame.
    pub fn shield_shown(&self) -> bool {
        self.shield_visual && !self.shield.is_some_and(|f| f.hidden())
    }
}

// ── Weapon ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Cooling down, at max charge, or overheated.
    Blocked,
    Fired,
    /// Fired, and the shot pushed charge to the ceiling.
    FiredAndOverheated,
}

/// Weapon heat: `charge` rises per burst and decays continuously.  Reaching
/// `max_charge` latches `overheated` until charge decays back to zero.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct WeaponHeat {
    pub charge: f32,
    pub max_charge: f32,
    pub charge_step: f32,
    pub decay_rate: f32,
    pub overheated: bool,
    /// Seconds until the next burst is allowed.
    pub cooldown: f32,
}

impl Default for WeaponHeat {
    fn default() -> Self {
        Self::new(MAX_CHARGE, CHARGE_STEP, CHARGE_DECAY)
    }
}

impl WeaponHeat {
    pub fn new(max_charge: f32, charge_step: f32, decay_rate: f32) -> Self {
        Self {
            charge: 0.0,
            max_charge,
            charge_step,
            decay_rate,
            overheated: false,
            cooldown: 0.0,
        }
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    #[inline]
    pub fn can_fire(&self) -> bool {
        self.cooldown <= 0.0 && self.charge < self.max_charge && !self.overheated
    }

    /// Attempt a burst.  On success adds `charge_step`, arms `fire_cooldown`
    /// and latches overheat if the ceiling was reached.
    pub fn try_fire(&mut self, fire_cooldown: f32) -> FireOutcome {
        if !self.can_fire() {
            return FireOutcome::Blocked;
        }
        self.charge += self.charge_step;
        self.cooldown = fire_cooldown;
        if self.charge >= self.max_charge {
            self.charge = self.max_charge;
            self.overheated = true;
            return FireOutcome::FiredAndOverheated;
        }
        FireOutcome::Fired
    }

    /// Bleed heat.  Returns `true` when this call cleared the overheat latch.
    pub fn decay(&mut self, dt: f32) -> bool {
        if self.charge <= 0.0 {
            return false;
        }
        self.charge -= self.decay_rate * dt;
        if self.charge <= 0.0 {
            self.charge = 0.0;
            let was_overheated = self.overheated;
            self.overheated = false;
            return was_overheated;
        }
        false
    }
}

/// Blinking overheat warning.  `Some` while the weapon is overheated.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct OverheatIndicator(pub Option<Blinker>);

impl OverheatIndicator {
    pub fn visible(&self) -> bool {
        self.0.is_some_and(|b| !b.hidden())
    }
}

/// Projectile parameters of the player's gun.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Gun {
    pub damage: f32,
    pub speed: f32,
}

impl Default for Gun {
    fn default() -> Self {
        Self {
            damage: PROJECTILE_DAMAGE,
            speed: PROJECTILE_SPEED,
        }
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Thruster {
    pub thrust_power: f32,
    pub max_velocity: f32,
}

impl Default for Thruster {
    fn default() -> Self {
        Self {
            thrust_power: THRUST_POWER,
            max_velocity: MAX_VELOCITY,
        }
    }
}

/// Coasting drag.  Starts when thrust is released while moving, grows toward
/// the cap, holds there, and resets to zero when thrust resumes.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct DragRamp {
    pub drag: f32,
    pub active: bool,
}

impl DragRamp {
    /// One step of the ramp.  Returns the drag to apply to the body.
    pub fn step(
        &mut self,
        thrusting: bool,
        moving: bool,
        dt: f32,
        increment: f32,
        max_drag: f32,
    ) -> f32 {
        if thrusting {
            self.active = false;
            self.drag = 0.0;
            return self.drag;
        }
        if moving {
            self.active = true;
        }
        if self.active && self.drag < max_drag {
            self.drag = (self.drag + increment * dt).min(max_drag);
        }
        self.drag
    }
}

/// Whether the thrust plume is emitting.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrustEmission(pub bool);

// ── HUD gauges ────────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone, PartialEq)]
pub struct HealthGauge(pub Gauge);

#[derive(Component, Debug, Clone, PartialEq)]
pub struct ChargeGauge(pub Gauge);

// ── Input ─────────────────────────────────────────────────────────────────────

/// Device-independent player input for the current frame.
///
/// Written by the input system in the binary; tests populate it directly.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub thrust: bool,
    pub fire: bool,
    /// World-space aim target (the cursor).  Kept across frames when the
    /// cursor leaves the window.
    pub cursor: Vec2,
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Damage entry point for the player.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DamagePlayer {
    pub amount: f32,
}

/// Purchased upgrades.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerUpgrade {
    Heal,
    Damage,
    Speed,
    Shield,
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: f32 = 1.5;
    const I: f32 = 0.15;

    #[test]
    fn weapon_charge_clamps_and_latches() {
        let mut heat = WeaponHeat {
            charge: 9.0,
            ..WeaponHeat::new(10.0, 0.4, 2.0)
        };

        assert_eq!(heat.try_fire(0.0), FireOutcome::Fired);
        assert!((heat.charge - 9.4).abs() < 1e-4);
        assert!(!heat.overheated);

        assert_eq!(heat.try_fire(0.0), FireOutcome::Fired);
        assert!((heat.charge - 9.8).abs() < 1e-4);
        assert!(!heat.overheated);

        assert_eq!(heat.try_fire(0.0), FireOutcome::FiredAndOverheated);
        assert_eq!(heat.charge, 10.0);
        assert!(heat.overheated);
        assert_eq!(heat.try_fire(0.0), FireOutcome::Blocked);
    }

    #[test]
    fn overheat_clears_only_at_zero() {
        let mut heat = WeaponHeat::new(10.0, 0.4, 2.0);
        heat.charge = 10.0;
        heat.overheated = true;

        assert!(!heat.decay(4.0));
        assert!(heat.overheated);
        assert!((heat.charge - 2.0).abs() < 1e-4);
        assert_eq!(heat.try_fire(0.0), FireOutcome::Blocked);

        assert!(heat.decay(2.0));
        assert_eq!(heat.charge, 0.0);
        assert!(!heat.overheated);
        assert_eq!(heat.try_fire(0.0), FireOutcome::Fired);
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut heat = WeaponHeat::default();
        assert_eq!(heat.try_fire(0.05), FireOutcome::Fired);
        assert_eq!(heat.try_fire(0.05), FireOutcome::Blocked);
        heat.tick_cooldown(0.05);
        assert_eq!(heat.try_fire(0.05), FireOutcome::Fired);
    }

    #[test]
    fn hit_then_invincible_then_hit_again() {
        let mut v = PlayerVitals::new(3.0);

        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Hurt);
        assert_eq!(v.hp, 2.0);
        assert!(v.is_temporarily_invincible());

        // Ignored while flickering.
        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Ignored);
        assert_eq!(v.hp, 2.0);

        for _ in 0..10 {
            v.tick(I);
        }
        assert!(!v.is_temporarily_invincible());
        assert!(!v.hull_hidden());

        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Hurt);
        assert_eq!(v.hp, 1.0);
        assert!(!v.dead);
        assert!(v.is_temporarily_invincible());

        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Ignored);
        assert_eq!(v.hp, 1.0);
    }

    #[test]
    fn shield_absorbs_one_charge_per_hit() {
        let mut v = PlayerVitals::new(10.0);
        v.grant_shield(2);

        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::ShieldAbsorbed);
        assert_eq!(v.shield_charges, 1);
        assert_eq!(v.hp, 10.0);
        assert!(v.is_shield_invincible());
        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Ignored);
        assert_eq!(v.shield_charges, 1);

        v.tick(2.0);
        assert!(v.shield_visual);
        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::ShieldAbsorbed);
        assert_eq!(v.shield_charges, 0);

        v.tick(2.0);
        assert!(!v.shield_visual);
        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Hurt);
        assert_eq!(v.hp, 9.0);
    }

    #[test]
    fn death_is_reported_once() {
        let mut v = PlayerVitals::new(1.0);
        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Killed);
        assert!(v.dead);
        assert!(!v.is_temporarily_invincible());
        assert_eq!(v.take_damage(1.0, D, I), PlayerDamage::Ignored);
    }

    #[test]
    fn drag_ramp_holds_at_cap_and_resets_on_thrust() {
        let mut ramp = DragRamp::default();
        assert_eq!(ramp.step(false, true, 0.1, 5.0, 2.5), 0.5);
        for _ in 0..10 {
            ramp.step(false, true, 0.1, 5.0, 2.5);
        }
        assert_eq!(ramp.drag, 2.5);
        // Still coasting after stopping: holds.
        assert_eq!(ramp.step(false, false, 0.1, 5.0, 2.5), 2.5);
        assert_eq!(ramp.step(true, true, 0.1, 5.0, 2.5), 0.0);
        assert!(!ramp.active);
    }

    #[test]
    fn drag_ramp_idle_when_never_moving() {
        let mut ramp = DragRamp::default();
        assert_eq!(ramp.step(false, false, 0.1, 5.0, 2.5), 0.0);
        assert!(!ramp.active);
    }
}
