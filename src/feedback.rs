//! Short audiovisual cues for hits and shots.
//!
//! Gameplay code never plays feedback directly.  An entity that wants cues
//! carries a [`FeedbackHooks`] component; handlers ask it for a cue with
//! [`FeedbackHooks::cue`] and write the result as a [`FeedbackCue`] message.
//! A missing hook (or a missing component) yields no cue, so feedback is
//! always optional.
//!
//! | System | Schedule | Purpose |
//! |--------|----------|---------|
//! | `play_feedback_system` | Update | Spawn a [`FeedbackFlash`] per cue |
//! | `feedback_flash_update_system` | Update | Age and despawn flashes |
//!
//! Flashes are drawn by [`crate::rendering`] as expanding gizmo rings.

use crate::config::TuningConfig;
use crate::routine::Countdown;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    Hurt,
    Shoot,
}

/// How a cue looks when played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackStyle {
    pub color: Color,
    pub radius: f32,
}

/// Optional per-entity feedback hooks.  `None` disables that cue.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedbackHooks {
    pub hurt: Option<FeedbackStyle>,
    pub shoot: Option<FeedbackStyle>,
}

impl FeedbackHooks {
    /// Hurt-only hooks used by vessels.
    pub fn hurt_only(color: Color, radius: f32) -> Self {
        Self {
            hurt: Some(FeedbackStyle { color, radius }),
            shoot: None,
        }
    }

    /// Build the cue for `kind` at `position`, or `None` if the hook is absent.
    pub fn cue(&self, kind: FeedbackKind, position: Vec2) -> Option<FeedbackCue> {
        let style = match kind {
            FeedbackKind::Hurt => self.hurt,
            FeedbackKind::Shoot => self.shoot,
        }?;
        Some(FeedbackCue {
            kind,
            position,
            style,
        })
    }
}

/// Request to play a cue once at a world position.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FeedbackCue {
    pub kind: FeedbackKind,
    pub position: Vec2,
    pub style: FeedbackStyle,
}

/// A playing cue.
#[derive(Component, Debug, Clone)]
pub struct FeedbackFlash {
    pub style: FeedbackStyle,
    pub lifetime: f32,
    pub remaining: Countdown,
}

impl FeedbackFlash {
    /// 0.0 when freshly spawned, 1.0 when about to expire.
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining.remaining() / self.lifetime).clamp(0.0, 1.0)
    }
}

pub fn play_feedback_system(
    mut commands: Commands,
    mut cues: MessageReader<FeedbackCue>,
    config: Res<TuningConfig>,
) {
    for cue in cues.read() {
        commands.spawn((
            FeedbackFlash {
                style: cue.style,
                lifetime: config.feedback_flash_lifetime,
                remaining: Countdown::new(config.feedback_flash_lifetime),
            },
            Transform::from_translation(cue.position.extend(1.0)),
        ));
    }
}

pub fn feedback_flash_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut q_flashes: Query<(Entity, &mut FeedbackFlash)>,
) {
    let dt = time.delta_secs();
    for (entity, mut flash) in q_flashes.iter_mut() {
        if flash.remaining.tick(dt) {
            commands.entity(entity).despawn();
        }
    }
}

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<FeedbackCue>().add_systems(
            Update,
            (play_feedback_system, feedback_flash_update_system).chain(),
        );
    }
}
