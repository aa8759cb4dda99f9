use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use flotilla::config::{self, TuningConfig};
use flotilla::player::{self, PlayerInputPlugin};
use flotilla::rendering::RenderingPlugin;
use flotilla::simulation::SimulationPlugin;
use flotilla::vessel::PopulationPlugin;

/// Configure Rapier physics: no gravity in open space.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Flotilla".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.05)))
        // Compiled defaults; load_tuning_config overwrites them from
        // assets/tuning.toml (if present) before anything else spawns.
        .insert_resource(TuningConfig::default())
        // World units are physics units: forces and radii in TuningConfig are
        // used as-is.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((
            SimulationPlugin,
            PopulationPlugin,
            PlayerInputPlugin,
            RenderingPlugin,
        ))
        .add_systems(
            Startup,
            (
                config::load_tuning_config,
                setup_physics_config,
                player::spawn_player_system.after(config::load_tuning_config),
            ),
        )
        .run();
}
