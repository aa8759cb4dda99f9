//! Runtime gameplay configuration loaded from `assets/tuning.toml`.
//!
//! [`TuningConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_tuning_config`] reads
//! `assets/tuning.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<TuningConfig>` to any system parameter list and read values
//! with `config.regen_interval`, `config.max_charge`, etc.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/tuning.toml`.
//! 2. Restart the game — no recompilation required.
//! 3. A file that fails [`TuningConfig::validate`] is rejected as a whole and
//!    the compiled defaults stay in place.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `TuningConfig::default()`.

use crate::constants::*;
use crate::error::{require_positive, SimError, SimResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the tuning file, relative to the working directory.
pub const TUNING_PATH: &str = "assets/tuning.toml";

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/tuning.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    // ── Camera ────────────────────────────────────────────────────────────────
    pub pixels_per_unit: f32,

    // ── Vessel Population ─────────────────────────────────────────────────────
    pub initial_vessel_count: u32,
    pub max_vessels: u32,
    pub vessel_spawn_interval: f32,
    pub spawn_radius_min: f32,
    pub spawn_radius_max: f32,

    // ── Vessel Shape ──────────────────────────────────────────────────────────
    pub vessel_min_scale: f32,
    pub vessel_max_scale: f32,
    pub vessel_base_radius: f32,
    pub bond_zone_radius: f32,

    // ── Vessel Motion ─────────────────────────────────────────────────────────
    pub vessel_min_speed: f32,
    pub vessel_max_speed: f32,
    pub min_speed_floor: f32,

    // ── Vessel Proximity ──────────────────────────────────────────────────────
    pub detection_radius: f32,
    pub proximity_interval: f32,
    pub proximity_force_loose: f32,
    pub proximity_force_bonded: f32,

    // ── Vessel Health ─────────────────────────────────────────────────────────
    pub vessel_max_hp: f32,
    pub regen_interval: f32,
    pub regen_amount: f32,
    pub death_delay: f32,
    pub kill_reward: u32,

    // ── Player: Movement ──────────────────────────────────────────────────────
    pub player_max_hp: f32,
    pub max_velocity: f32,
    pub thrust_power: f32,
    pub drag_increment: f32,
    pub max_drag: f32,
    pub rotation_speed: f32,
    pub facing_bias_degrees: f32,
    pub player_collider_radius: f32,
    pub player_hitbox_radius: f32,

    // ── Player: Weapon ────────────────────────────────────────────────────────
    pub fire_cooldown: f32,
    pub charge_step: f32,
    pub charge_decay: f32,
    pub max_charge: f32,
    pub spread_divisor: f32,
    pub burst_size: u32,
    pub overheat_flash_interval: f32,
    pub muzzle_offset: f32,

    // ── Projectiles ───────────────────────────────────────────────────────────
    pub projectile_damage: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_collider_radius: f32,

    // ── Player: Defence ───────────────────────────────────────────────────────
    pub invincibility_duration: f32,
    pub invincibility_blink_interval: f32,
    pub shield_charges: u32,
    pub hazard_damage: f32,

    // ── Player: Upgrades ──────────────────────────────────────────────────────
    pub heal_amount: f32,
    pub upgrade_projectile_speed_step: f32,
    pub upgrade_max_charge_step: f32,
    pub upgrade_charge_decay_step: f32,
    pub upgrade_thrust_step: f32,
    pub upgrade_max_velocity_step: f32,

    // ── Links / Feedback ──────────────────────────────────────────────────────
    pub link_radius: f32,
    pub feedback_flash_lifetime: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            // Camera
            pixels_per_unit: PIXELS_PER_UNIT,
            // Vessel Population
            initial_vessel_count: INITIAL_VESSEL_COUNT,
            max_vessels: MAX_VESSELS,
            vessel_spawn_interval: VESSEL_SPAWN_INTERVAL,
            spawn_radius_min: SPAWN_RADIUS_MIN,
            spawn_radius_max: SPAWN_RADIUS_MAX,
            // Vessel Shape
            vessel_min_scale: VESSEL_MIN_SCALE,
            vessel_max_scale: VESSEL_MAX_SCALE,
            vessel_base_radius: VESSEL_BASE_RADIUS,
            bond_zone_radius: BOND_ZONE_RADIUS,
            // Vessel Motion
            vessel_min_speed: VESSEL_MIN_SPEED,
            vessel_max_speed: VESSEL_MAX_SPEED,
            min_speed_floor: MIN_SPEED_FLOOR,
            // Vessel Proximity
            detection_radius: DETECTION_RADIUS,
            proximity_interval: PROXIMITY_INTERVAL,
            proximity_force_loose: PROXIMITY_FORCE_LOOSE,
            proximity_force_bonded: PROXIMITY_FORCE_BONDED,
            // Vessel Health
            vessel_max_hp: VESSEL_MAX_HP,
            regen_interval: REGEN_INTERVAL,
            regen_amount: REGEN_AMOUNT,
            death_delay: DEATH_DELAY,
            kill_reward: KILL_REWARD,
            // Player: Movement
            player_max_hp: PLAYER_MAX_HP,
            max_velocity: MAX_VELOCITY,
            thrust_power: THRUST_POWER,
            drag_increment: DRAG_INCREMENT,
            max_drag: MAX_DRAG,
            rotation_speed: ROTATION_SPEED,
            facing_bias_degrees: FACING_BIAS_DEGREES,
            player_collider_radius: PLAYER_COLLIDER_RADIUS,
            player_hitbox_radius: PLAYER_HITBOX_RADIUS,
            // Player: Weapon
            fire_cooldown: FIRE_COOLDOWN,
            charge_step: CHARGE_STEP,
            charge_decay: CHARGE_DECAY,
            max_charge: MAX_CHARGE,
            spread_divisor: SPREAD_DIVISOR,
            burst_size: BURST_SIZE,
            overheat_flash_interval: OVERHEAT_FLASH_INTERVAL,
            muzzle_offset: MUZZLE_OFFSET,
            // Projectiles
            projectile_damage: PROJECTILE_DAMAGE,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            projectile_collider_radius: PROJECTILE_COLLIDER_RADIUS,
            // Player: Defence
            invincibility_duration: INVINCIBILITY_DURATION,
            invincibility_blink_interval: INVINCIBILITY_BLINK_INTERVAL,
            shield_charges: SHIELD_CHARGES,
            hazard_damage: HAZARD_DAMAGE,
            // Player: Upgrades
            heal_amount: HEAL_AMOUNT,
            upgrade_projectile_speed_step: UPGRADE_PROJECTILE_SPEED_STEP,
            upgrade_max_charge_step: UPGRADE_MAX_CHARGE_STEP,
            upgrade_charge_decay_step: UPGRADE_CHARGE_DECAY_STEP,
            upgrade_thrust_step: UPGRADE_THRUST_STEP,
            upgrade_max_velocity_step: UPGRADE_MAX_VELOCITY_STEP,
            // Links / Feedback
            link_radius: LINK_RADIUS,
            feedback_flash_lifetime: FEEDBACK_FLASH_LIFETIME,
        }
    }
}

impl TuningConfig {
    /// Reject values that would stall or destabilise the simulation.
    ///
    /// Intervals and divisors must be strictly positive (a zero interval would
    /// spin a routine forever within one frame), and every `min`/`max` pair
    /// must describe a non-empty range.
    pub fn validate(&self) -> SimResult<()> {
        require_positive("pixels_per_unit", self.pixels_per_unit)?;
        require_positive("vessel_spawn_interval", self.vessel_spawn_interval)?;
        require_positive("vessel_min_scale", self.vessel_min_scale)?;
        require_positive("vessel_base_radius", self.vessel_base_radius)?;
        require_positive("bond_zone_radius", self.bond_zone_radius)?;
        require_positive("detection_radius", self.detection_radius)?;
        require_positive("proximity_interval", self.proximity_interval)?;
        require_positive("vessel_max_hp", self.vessel_max_hp)?;
        require_positive("regen_interval", self.regen_interval)?;
        require_positive("player_max_hp", self.player_max_hp)?;
        require_positive("max_velocity", self.max_velocity)?;
        require_positive("fire_cooldown", self.fire_cooldown)?;
        require_positive("charge_step", self.charge_step)?;
        require_positive("max_charge", self.max_charge)?;
        require_positive("spread_divisor", self.spread_divisor)?;
        require_positive("overheat_flash_interval", self.overheat_flash_interval)?;
        require_positive("projectile_lifetime", self.projectile_lifetime)?;
        require_positive("invincibility_blink_interval", self.invincibility_blink_interval)?;

        if self.vessel_max_scale <= self.vessel_min_scale {
            return Err(SimError::UnsafeConstant {
                name: "vessel_max_scale",
                value: self.vessel_max_scale,
                safe_range: "(vessel_min_scale, ∞)",
            });
        }
        if self.vessel_max_speed <= self.vessel_min_speed {
            return Err(SimError::UnsafeConstant {
                name: "vessel_max_speed",
                value: self.vessel_max_speed,
                safe_range: "(vessel_min_speed, ∞)",
            });
        }
        if self.spawn_radius_max <= self.spawn_radius_min {
            return Err(SimError::UnsafeConstant {
                name: "spawn_radius_max",
                value: self.spawn_radius_max,
                safe_range: "(spawn_radius_min, ∞)",
            });
        }
        if self.burst_size == 0 {
            return Err(SimError::UnsafeConstant {
                name: "burst_size",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        Ok(())
    }

    /// Facing bias converted to radians.
    #[inline]
    pub fn facing_bias(&self) -> f32 {
        self.facing_bias_degrees.to_radians()
    }
}

/// Parse and validate a tuning file's contents.
pub fn parse_tuning(contents: &str) -> Result<TuningConfig, String> {
    let loaded = toml::from_str::<TuningConfig>(contents).map_err(|e| e.to_string())?;
    loaded.validate().map_err(|e| e.to_string())?;
    Ok(loaded)
}

/// Startup system: attempt to load `assets/tuning.toml` and overwrite the
/// `TuningConfig` resource with the values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the game.  A missing file is not an error.
pub fn load_tuning_config(mut config: ResMut<TuningConfig>) {
    match std::fs::read_to_string(TUNING_PATH) {
        Ok(contents) => match parse_tuning(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded tuning config from {TUNING_PATH}");
            }
            Err(e) => {
                warn!("Rejected {TUNING_PATH}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {TUNING_PATH} found; using compiled defaults");
        }
    }
}
