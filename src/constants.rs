//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::TuningConfig`] mirrors every value and can override any of
//! them from `assets/tuning.toml`.
//!
//! ## Units
//!
//! The world is laid out in "hull units": a scale-1.0 vessel has a body radius
//! of [`VESSEL_BASE_RADIUS`].  The camera renders [`PIXELS_PER_UNIT`] screen
//! pixels per world unit, so every distance and speed below is in hull units.

// ── Camera ────────────────────────────────────────────────────────────────────

/// Screen pixels per world unit.  The orthographic projection scale is the
/// reciprocal of this value.
pub const PIXELS_PER_UNIT: f32 = 32.0;

// ── Vessel Population ─────────────────────────────────────────────────────────

/// Vessels spawned at startup.
pub const INITIAL_VESSEL_COUNT: u32 = 24;

/// The spawner never tops the population up beyond this count.
pub const MAX_VESSELS: u32 = 40;

/// Seconds between two population top-up checks.
pub const VESSEL_SPAWN_INTERVAL: f32 = 2.0;

/// Inner radius of the spawn annulus around the origin (keeps the player's
/// start position clear).
pub const SPAWN_RADIUS_MIN: f32 = 8.0;

/// Outer radius of the spawn annulus.
pub const SPAWN_RADIUS_MAX: f32 = 30.0;

// ── Vessel Shape ──────────────────────────────────────────────────────────────

/// Smallest scale a vessel can be spawned with (inclusive).
pub const VESSEL_MIN_SCALE: f32 = 1.0;

/// Largest scale a vessel can be spawned with (exclusive).
pub const VESSEL_MAX_SCALE: f32 = 2.0;

/// Body collider radius of a scale-1.0 vessel.
pub const VESSEL_BASE_RADIUS: f32 = 0.4;

/// Bond-zone sensor radius of a scale-1.0 vessel.  Larger than the body so
/// bond zones overlap shortly before the hulls touch.
pub const BOND_ZONE_RADIUS: f32 = 0.65;

/// Number of hull variants a vessel picks from at spawn.
pub const HULL_STYLE_COUNT: u8 = 4;

// ── Vessel Motion ─────────────────────────────────────────────────────────────

/// Slowest launch speed (u/s, inclusive).
pub const VESSEL_MIN_SPEED: f32 = 5.0;

/// Fastest launch speed (u/s, exclusive).
pub const VESSEL_MAX_SPEED: f32 = 15.0;

/// Speed below which a vessel's velocity is doubled every fixed step.
pub const MIN_SPEED_FLOOR: f32 = 2.0;

// ── Vessel Proximity ──────────────────────────────────────────────────────────

/// Radius scanned for neighbours on each proximity pulse.
pub const DETECTION_RADIUS: f32 = 3.0;

/// Side of one neighbour-grid cell (u).  Keep it near `DETECTION_RADIUS` so a
/// pulse only scans the 3×3 block around its own cell.
pub const GRID_CELL_SIZE: f32 = 4.0;

/// Seconds between two proximity pulses of the same vessel.
pub const PROXIMITY_INTERVAL: f32 = 1.5;

/// Force numerator used when either vessel of a pair is unbonded
/// (`force = k / distance`).
pub const PROXIMITY_FORCE_LOOSE: f32 = 10.0;

/// Force numerator used when both vessels of a pair are bonded.
pub const PROXIMITY_FORCE_BONDED: f32 = 100.0;

// ── Vessel Health ─────────────────────────────────────────────────────────────

/// Maximum (and starting) vessel HP.
pub const VESSEL_MAX_HP: f32 = 3.0;

/// Seconds between two regeneration ticks (also the initial delay).
pub const REGEN_INTERVAL: f32 = 4.0;

/// HP restored per regeneration tick.
pub const REGEN_AMOUNT: f32 = 1.0;

/// Seconds between a vessel's death and its removal from the world.
pub const DEATH_DELAY: f32 = 0.3;

/// Currency credited to the session for every destroyed vessel.
pub const KILL_REWARD: u32 = 25;

// ── Player: Movement ──────────────────────────────────────────────────────────

/// Maximum (and starting) player HP.
pub const PLAYER_MAX_HP: f32 = 10.0;

/// Player speed cap while thrusting (u/s).
pub const MAX_VELOCITY: f32 = 5.0;

/// Thrust force scale; multiplied by the fixed timestep each step.
pub const THRUST_POWER: f32 = 300.0;

/// Damping gained per second while coasting.
pub const DRAG_INCREMENT: f32 = 5.0;

/// Damping ceiling reached while coasting.
pub const MAX_DRAG: f32 = 2.5;

/// Slerp rate of the aim rotation (per second).
pub const ROTATION_SPEED: f32 = 1.0;

/// Angular offset (degrees) between the aim direction and the hull's local +Y.
pub const FACING_BIAS_DEGREES: f32 = 180.0;

/// Player body collider radius.
pub const PLAYER_COLLIDER_RADIUS: f32 = 0.45;

/// Player hazard sensor radius (slightly larger than the body).
pub const PLAYER_HITBOX_RADIUS: f32 = 0.55;

// ── Player: Weapon ────────────────────────────────────────────────────────────

/// Minimum seconds between two bursts.
pub const FIRE_COOLDOWN: f32 = 0.05;

/// Heat added per burst.
pub const CHARGE_STEP: f32 = 0.4;

/// Heat removed per second while above zero.
pub const CHARGE_DECAY: f32 = 2.0;

/// Heat ceiling; reaching it latches the overheat state.
pub const MAX_CHARGE: f32 = 10.0;

/// Divisor applied to the random unit offset of each projectile direction.
/// Larger values give a tighter cone.
pub const SPREAD_DIVISOR: f32 = 6.0;

/// Projectiles per burst.
pub const BURST_SIZE: u32 = 3;

/// Seconds between two toggles of the overheat indicator.
pub const OVERHEAT_FLASH_INTERVAL: f32 = 0.6;

/// Distance from the hull centre at which projectiles are spawned.
pub const MUZZLE_OFFSET: f32 = 0.7;

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Damage carried by a fresh projectile.
pub const PROJECTILE_DAMAGE: f32 = 1.0;

/// Launch speed added on top of the shooter's velocity (u/s).
pub const PROJECTILE_SPEED: f32 = 25.0;

/// Seconds before an unspent projectile is despawned.
pub const PROJECTILE_LIFETIME: f32 = 2.0;

/// Projectile sensor radius.
pub const PROJECTILE_COLLIDER_RADIUS: f32 = 0.08;

// ── Player: Defence ───────────────────────────────────────────────────────────

/// Total seconds of a post-hit or shield flicker.
pub const INVINCIBILITY_DURATION: f32 = 1.5;

/// Seconds between two flicker toggles.
pub const INVINCIBILITY_BLINK_INTERVAL: f32 = 0.15;

/// Charges granted by a shield purchase.
pub const SHIELD_CHARGES: u32 = 3;

/// Damage dealt by touching a vessel hull or a link segment.
pub const HAZARD_DAMAGE: f32 = 1.0;

// ── Player: Upgrades ──────────────────────────────────────────────────────────

/// HP restored by a heal.
pub const HEAL_AMOUNT: f32 = 1.0;

/// Projectile speed gained per damage upgrade.
pub const UPGRADE_PROJECTILE_SPEED_STEP: f32 = 5.0;

/// Heat ceiling gained per damage upgrade.
pub const UPGRADE_MAX_CHARGE_STEP: f32 = 2.0;

/// Heat decay rate gained per damage upgrade.
pub const UPGRADE_CHARGE_DECAY_STEP: f32 = 0.5;

/// Thrust power gained per speed upgrade.
pub const UPGRADE_THRUST_STEP: f32 = 75.0;

/// Speed cap gained per speed upgrade.
pub const UPGRADE_MAX_VELOCITY_STEP: f32 = 1.5;

// ── Links ─────────────────────────────────────────────────────────────────────

/// Capsule radius of a link segment sensor.
pub const LINK_RADIUS: f32 = 0.05;

// ── Feedback ──────────────────────────────────────────────────────────────────

/// Seconds a feedback flash stays on screen.
pub const FEEDBACK_FLASH_LIFETIME: f32 = 0.25;
