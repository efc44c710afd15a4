use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use perigee::camera::ChaseCameraPlugin;
use perigee::config::{self, LanderConfig};
use perigee::level::LevelPlugin;
use perigee::particles::ParticlesPlugin;
use perigee::rocket::RocketPlugin;

/// Configure Rapier physics: disable engine gravity.  The rocket controller
/// applies its own weight force every tick, so the solver must not add more.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Perigee".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.05)))
        // Insert LanderConfig with compiled defaults; load_lander_config will
        // overwrite it from assets/lander.toml (if present) in the Startup schedule.
        .insert_resource(LanderConfig::default())
        // pixels_per_meter(1.0) keeps world units identical to physics units so
        // the force constants in src/constants.rs mean what they say.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((
            RocketPlugin,
            ChaseCameraPlugin,
            LevelPlugin,
            ParticlesPlugin,
        ))
        .add_systems(
            Startup,
            (config::load_lander_config, setup_physics_config),
        )
        .run();
}
