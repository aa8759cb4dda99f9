//! Player input, thrust and aiming.
//!
//! ## Pipeline
//!
//! 1. [`player_intent_clear_system`] — resets the per-frame fields of `PlayerIntent` (binary only).
//! 2. [`keyboard_mouse_to_intent_system`] — space / left mouse / cursor into `PlayerIntent` (binary only).
//! 3. [`player_thrust_system`] (FixedUpdate) — thrust force toward the cursor, velocity clamp, emission.
//! 4. [`player_drag_system`] (FixedUpdate) — coasting drag ramp written to `Damping`.
//! 5. [`player_aim_system`] (Update) — smooth rotation toward the cursor.
//!
//! Steps 3–5 only read `PlayerIntent`, so tests populate the resource directly
//! and never need a window or `ButtonInput`.

use super::state::{DragRamp, Player, PlayerIntent, PlayerVitals, ThrustEmission, Thruster};
use crate::config::TuningConfig;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier2d::prelude::*;

// ── Pure helpers ──────────────────────────────────────────────────────────────

/// Unit vector from `position` toward `cursor`, or `None` when they coincide.
#[inline]
pub fn aim_direction(position: Vec2, cursor: Vec2) -> Option<Vec2> {
    (cursor - position).try_normalize()
}

/// Rotation whose local +Y points along `direction`, offset by `bias` radians.
pub fn aim_rotation(direction: Vec2, bias: f32) -> Quat {
    let angle = direction.y.atan2(direction.x) - std::f32::consts::FRAC_PI_2;
    Quat::from_rotation_z(angle + bias)
}

/// One frame of the aim slerp.  The interpolation factor saturates at 1.
pub fn step_aim(current: Quat, target: Quat, dt: f32, rotation_speed: f32) -> Quat {
    current.slerp(target, (dt * rotation_speed).clamp(0.0, 1.0))
}

/// World-space direction the hull is currently pointing, with the facing bias
/// removed.  Used for the muzzle position.
pub fn hull_forward(rotation: Quat, bias: f32) -> Vec2 {
    (rotation * Quat::from_rotation_z(-bias))
        .mul_vec3(Vec3::Y)
        .truncate()
}

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

/// Reset the per-frame buttons.  The cursor is kept so aiming survives the
/// pointer leaving the window.
pub fn player_intent_clear_system(mut intent: ResMut<PlayerIntent>) {
    intent.thrust = false;
    intent.fire = false;
}

// ── Step 2: Devices → Intent ──────────────────────────────────────────────────

/// - **Space** → `thrust`
/// - **Left mouse** → `fire`
/// - cursor position → `cursor` (world space)
pub fn keyboard_mouse_to_intent_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform)>,
    mut intent: ResMut<PlayerIntent>,
) {
    intent.thrust = keys.pressed(KeyCode::Space);
    intent.fire = mouse.pressed(MouseButton::Left);

    let Ok(window) = q_window.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = q_camera.single() else {
        return;
    };
    if let Some(world) = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world_2d(camera_transform, cursor).ok())
    {
        intent.cursor = world;
    }
}

// ── Step 3: Thrust ────────────────────────────────────────────────────────────

/// While thrusting, push toward the cursor with `thrust_power * dt` and clamp
/// speed to `max_velocity`.  Also drives the thrust plume.
pub fn player_thrust_system(
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    mut q_player: Query<
        (
            &Transform,
            &Thruster,
            &PlayerVitals,
            &mut ExternalForce,
            &mut Velocity,
            &mut ThrustEmission,
        ),
        With<Player>,
    >,
) {
    let Ok((transform, thruster, vitals, mut force, mut velocity, mut emission)) =
        q_player.single_mut()
    else {
        return;
    };

    let thrusting = intent.thrust && !vitals.dead;
    let direction = aim_direction(transform.translation.truncate(), intent.cursor);
    force.force = match (thrusting, direction) {
        (true, Some(dir)) => dir * thruster.thrust_power * time.delta_secs(),
        _ => Vec2::ZERO,
    };
    if thrusting {
        velocity.linvel = velocity.linvel.clamp_length_max(thruster.max_velocity);
    }

    // Stationary and idle leaves the plume as it was.
    let emitting = thrusting || (emission.0 && velocity.linvel == Vec2::ZERO);
    if emission.0 != emitting {
        emission.0 = emitting;
    }
}

// ── Step 4: Drag ramp ─────────────────────────────────────────────────────────

pub fn player_drag_system(
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    config: Res<TuningConfig>,
    mut q_player: Query<(&Velocity, &mut DragRamp, &mut Damping), With<Player>>,
) {
    let Ok((velocity, mut ramp, mut damping)) = q_player.single_mut() else {
        return;
    };
    let drag = ramp.step(
        intent.thrust,
        velocity.linvel != Vec2::ZERO,
        time.delta_secs(),
        config.drag_increment,
        config.max_drag,
    );
    if damping.linear_damping != drag {
        damping.linear_damping = drag;
        damping.angular_damping = drag;
    }
}

// ── Step 5: Aim ───────────────────────────────────────────────────────────────

/// Rotate the hull toward the cursor.  Physics never spins the player.
pub fn player_aim_system(
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    config: Res<TuningConfig>,
    mut q_player: Query<(&mut Transform, &mut Velocity, &PlayerVitals), With<Player>>,
) {
    let Ok((mut transform, mut velocity, vitals)) = q_player.single_mut() else {
        return;
    };
    if vitals.dead {
        return;
    }
    velocity.angvel = 0.0;
    let Some(direction) = aim_direction(transform.translation.truncate(), intent.cursor) else {
        return;
    };
    let target = aim_rotation(direction, config.facing_bias());
    transform.rotation = step_aim(
        transform.rotation,
        target,
        time.delta_secs(),
        config.rotation_speed,
    );
}
