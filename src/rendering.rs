//! Rendering: camera, gizmo drawing and the HUD.
//!
//! Everything is immediate-mode gizmos except the HUD text, which is Bevy UI.
//! Nothing here writes gameplay state.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `setup_camera`              | Startup | 2D camera zoomed to `pixels_per_unit` |
//! | `setup_hud`                 | Startup | Currency / population text node |
//! | `camera_follow_system`      | Update | Centre the camera on the player |
//! | `vessel_gizmo_system`       | Update | Hulls and bond rings |
//! | `link_gizmo_system`         | Update | Tethers between endpoints |
//! | `player_gizmo_system`       | Update | Hull, shield, plume, overheat warning, gauges |
//! | `projectile_gizmo_system`   | Update | Projectile streaks |
//! | `feedback_gizmo_system`     | Update | Expanding hit / muzzle flashes |
//! | `hud_display_system`        | Update | Refresh HUD text |

use crate::config::TuningConfig;
use crate::feedback::FeedbackFlash;
use crate::gauge::Gauge;
use crate::link::Link;
use crate::player::control::hull_forward;
use crate::player::{
    ChargeGauge, HealthGauge, OverheatIndicator, Player, PlayerVitals, ThrustEmission,
};
use crate::projectile::Projectile;
use crate::session::{GameState, Session};
use crate::vessel::{Bonds, Dying, HullStyle, Vessel, VesselHealth, VesselScale};
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;
use std::f32::consts::TAU;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Closed outline of a regular polygon with `sides` corners.
pub fn polygon_outline(center: Vec2, radius: f32, sides: usize, rotation: f32) -> Vec<Vec2> {
    (0..=sides)
        .map(|i| {
            let angle = rotation + i as f32 / sides as f32 * TAU;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Hull styles are drawn as triangle, square, pentagon, hexagon, …
#[inline]
fn hull_sides(style: HullStyle) -> usize {
    3 + style.0 as usize
}

/// Horizontal bar for a gauge, `offset` above (or below) `anchor`.
fn draw_gauge(gizmos: &mut Gizmos, gauge: &Gauge, anchor: Vec2, offset: f32, half_width: f32) {
    let start = anchor + Vec2::new(-half_width, offset);
    let end = anchor + Vec2::new(half_width, offset);
    gizmos.line_2d(start, end, Color::srgba(0.25, 0.25, 0.25, 0.8));
    let fraction = gauge.fill_fraction();
    if fraction > 0.0 {
        let fill_end = start + Vec2::new(half_width * 2.0 * fraction, 0.0);
        gizmos.line_2d(start, fill_end, gauge.fill_color());
    }
}

// ── Camera ────────────────────────────────────────────────────────────────────

pub fn setup_camera(mut commands: Commands, config: Res<TuningConfig>) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / config.pixels_per_unit,
            ..OrthographicProjection::default_2d()
        }),
    ));
    info!("Camera spawned at {} px/unit", config.pixels_per_unit);
}

/// Keep the camera centred on the player.
pub fn camera_follow_system(
    q_player: Query<&Transform, With<Player>>,
    mut q_camera: Query<&mut Transform, (With<Camera>, Without<Player>)>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let Ok(mut camera) = q_camera.single_mut() else {
        return;
    };
    camera.translation.x = player.translation.x;
    camera.translation.y = player.translation.y;
}

// ── Gizmos ────────────────────────────────────────────────────────────────────

pub fn vessel_gizmo_system(
    mut gizmos: Gizmos,
    config: Res<TuningConfig>,
    q_vessels: Query<
        (
            &Transform,
            &VesselScale,
            &HullStyle,
            &VesselHealth,
            &Bonds,
            Has<Dying>,
        ),
        With<Vessel>,
    >,
) {
    for (transform, scale, style, health, bonds, dying) in q_vessels.iter() {
        let center = transform.translation.truncate();
        let radius = config.vessel_base_radius * scale.size;
        let (_, _, angle) = transform.rotation.to_euler(EulerRot::XYZ);

        let color = if dying {
            Color::srgb(0.4, 0.4, 0.4)
        } else {
            let hp_frac = (health.hp / health.max_hp).clamp(0.0, 1.0);
            Color::srgb(1.0, 0.35 + 0.5 * hp_frac, 0.2 + 0.3 * hp_frac)
        };
        gizmos.linestrip_2d(polygon_outline(center, radius, hull_sides(*style), angle), color);

        if bonds.is_connected() && !dying {
            gizmos.circle_2d(center, radius * 1.25, Color::srgba(0.4, 0.8, 1.0, 0.6));
        }
    }
}

/// Tethers are drawn between the current endpoint positions.
pub fn link_gizmo_system(
    mut gizmos: Gizmos,
    q_links: Query<&Link>,
    q_vessels: Query<&Transform, With<Vessel>>,
) {
    for link in q_links.iter() {
        if let (Ok(a), Ok(b)) = (q_vessels.get(link.a), q_vessels.get(link.b)) {
            gizmos.line_2d(
                a.translation.truncate(),
                b.translation.truncate(),
                Color::srgba(0.5, 0.85, 1.0, 0.9),
            );
        }
    }
}

pub fn player_gizmo_system(
    mut gizmos: Gizmos,
    config: Res<TuningConfig>,
    q_player: Query<
        (
            &Transform,
            &Velocity,
            &PlayerVitals,
            &ThrustEmission,
            &OverheatIndicator,
            &HealthGauge,
            &ChargeGauge,
        ),
        With<Player>,
    >,
) {
    let Ok((transform, velocity, vitals, emission, overheat, health, charge)) = q_player.single()
    else {
        return;
    };
    let pos = transform.translation.truncate();
    let radius = config.player_collider_radius;

    if !vitals.dead && !vitals.hull_hidden() {
        let nose = hull_forward(transform.rotation, config.facing_bias());
        let side = nose.perp();
        let tip = pos + nose * radius * 1.4;
        let left = pos - nose * radius + side * radius;
        let right = pos - nose * radius - side * radius;
        gizmos.linestrip_2d([tip, left, right, tip], Color::srgb(0.85, 0.95, 1.0));

        if emission.0 {
            let tail = pos - nose * radius;
            let flame = tail - nose * radius * (0.8 + 0.05 * velocity.linvel.length());
            gizmos.line_2d(tail, flame, Color::srgb(1.0, 0.6, 0.1));
        }
    }

    if vitals.shield_shown() {
        gizmos.circle_2d(
            pos,
            config.player_hitbox_radius * 1.4,
            Color::srgba(0.3, 0.7, 1.0, 0.8),
        );
    }

    if overheat.visible() {
        gizmos.circle_2d(pos, radius * 0.5, Color::srgb(1.0, 0.2, 0.1));
    }

    draw_gauge(&mut gizmos, &health.0, pos, radius * 2.2, radius * 1.6);
    draw_gauge(&mut gizmos, &charge.0, pos, -radius * 2.2, radius * 1.6);
}

pub fn projectile_gizmo_system(
    mut gizmos: Gizmos,
    q_projectiles: Query<(&Transform, &Velocity), With<Projectile>>,
) {
    for (transform, velocity) in q_projectiles.iter() {
        let head = transform.translation.truncate();
        let tail = head - velocity.linvel.normalize_or_zero() * 0.25;
        gizmos.line_2d(tail, head, Color::srgb(1.0, 0.95, 0.4));
    }
}

pub fn feedback_gizmo_system(mut gizmos: Gizmos, q_flashes: Query<(&Transform, &FeedbackFlash)>) {
    for (transform, flash) in q_flashes.iter() {
        let progress = flash.progress();
        let color = flash.style.color.with_alpha(1.0 - progress);
        gizmos.circle_2d(
            transform.translation.truncate(),
            flash.style.radius * (0.3 + 0.7 * progress),
            color,
        );
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

#[derive(Component)]
pub struct HudDisplay;

pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Credits: 0"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
            ));
        });
}

pub fn hud_display_system(
    session: Res<Session>,
    state: Res<State<GameState>>,
    q_hud: Query<&Children, With<HudDisplay>>,
    mut q_text: Query<&mut Text>,
) {
    if !session.is_changed() && !state.is_changed() {
        return;
    }
    let line = match state.get() {
        GameState::Playing => format!(
            "Credits: {}  Vessels: {}",
            session.currency, session.alive_vessels
        ),
        GameState::GameOver => format!("GAME OVER  Credits: {}", session.currency),
    };
    for children in q_hud.iter() {
        for child in children.iter() {
            if let Ok(mut text) = q_text.get_mut(child) {
                *text = Text::new(line.clone());
            }
        }
    }
}

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                setup_camera.after(crate::config::load_tuning_config),
                setup_hud,
            ),
        )
        .add_systems(
            Update,
            (
                vessel_gizmo_system,
                link_gizmo_system,
                player_gizmo_system,
                projectile_gizmo_system,
                feedback_gizmo_system,
                hud_display_system,
                camera_follow_system,
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_outline_is_closed() {
        let pts = polygon_outline(Vec2::ZERO, 2.0, 5, 0.3);
        assert_eq!(pts.len(), 6);
        assert!((pts[0] - pts[5]).length() < 1e-5);
        for p in pts {
            assert!((p.length() - 2.0).abs() < 1e-5);
        }
    }
}
