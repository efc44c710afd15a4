//! Runtime lander configuration loaded from `assets/lander.toml`.
//!
//! [`LanderConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_lander_config`] reads
//! `assets/lander.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<LanderConfig>` to any system parameter list and read values
//! with `config.lift_multiplier`, `config.finish_delay`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `LanderConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable flight and presentation configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/lander.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanderConfig {
    // ── Rocket: Flight ───────────────────────────────────────────────────────
    pub lift_multiplier: f32,
    pub rotation_multiplier: f32,
    pub gravity_acceleration: f32,

    // ── Rocket: Outcome Sequencing ───────────────────────────────────────────
    pub finish_delay: f32,
    pub death_delay: f32,
    pub explosion_base_force: f32,
    pub explosion_velocity_multiplier: f32,
    pub min_explosion_multiplier: f32,

    // ── Rocket: Thrust Audio ─────────────────────────────────────────────────
    pub volume_fade_rate: f32,
    pub rocket_base_volume: f32,

    // ── Chase Camera ─────────────────────────────────────────────────────────
    pub camera_offset: [f32; 3],
    pub camera_velocity_lead: [f32; 2],
    pub flight_lerp_rate: f32,
    pub collision_lerp_rate: f32,
    pub explosion_lerp_rate: f32,
    pub lerp_rate_smoothing: f32,
    pub death_depth_pushback: f32,

    // ── Level Transitions ────────────────────────────────────────────────────
    pub first_level: String,
    pub fade_speed: f32,

    // ── Input ────────────────────────────────────────────────────────────────
    pub gamepad_deadzone: f32,
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self {
            // Rocket: Flight
            lift_multiplier: LIFT_MULTIPLIER,
            rotation_multiplier: ROTATION_MULTIPLIER,
            gravity_acceleration: GRAVITY_ACCELERATION,
            // Rocket: Outcome Sequencing
            finish_delay: FINISH_DELAY,
            death_delay: DEATH_DELAY,
            explosion_base_force: EXPLOSION_BASE_FORCE,
            explosion_velocity_multiplier: EXPLOSION_VELOCITY_MULTIPLIER,
            min_explosion_multiplier: MIN_EXPLOSION_MULTIPLIER,
            // Rocket: Thrust Audio
            volume_fade_rate: VOLUME_FADE_RATE,
            rocket_base_volume: ROCKET_BASE_VOLUME,
            // Chase Camera
            camera_offset: CAMERA_OFFSET,
            camera_velocity_lead: CAMERA_VELOCITY_LEAD,
            flight_lerp_rate: FLIGHT_LERP_RATE,
            collision_lerp_rate: COLLISION_LERP_RATE,
            explosion_lerp_rate: EXPLOSION_LERP_RATE,
            lerp_rate_smoothing: LERP_RATE_SMOOTHING,
            death_depth_pushback: DEATH_DEPTH_PUSHBACK,
            // Level Transitions
            first_level: FIRST_LEVEL.to_string(),
            fade_speed: FADE_SPEED,
            // Input
            gamepad_deadzone: GAMEPAD_DEADZONE,
        }
    }
}

impl LanderConfig {
    /// Camera offset as a vector.
    #[inline]
    pub fn camera_offset_vec(&self) -> Vec3 {
        Vec3::from_array(self.camera_offset)
    }

    /// Velocity-lead multipliers as a vector.
    #[inline]
    pub fn camera_velocity_lead_vec(&self) -> Vec2 {
        Vec2::from_array(self.camera_velocity_lead)
    }
}

/// Startup system: attempt to load `assets/lander.toml` and overwrite the
/// `LanderConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the game.  A missing file is silently ignored (defaults
/// are already in place from `insert_resource`).
pub fn load_lander_config(mut config: ResMut<LanderConfig>) {
    let path = "assets/lander.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<LanderConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded lander config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            info!("No {path} found; using compiled defaults");
        }
    }
}
