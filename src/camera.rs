//! Chase camera: velocity-led follow with an adaptive, self-smoothed lerp rate.
//!
//! Every tick the camera picks a target ahead of the rocket and a lerp rate
//! for how hard to pull toward it.  The rate depends on what the rocket is
//! doing — flying, scraping something, or exploding — and the *rate itself* is
//! smoothed between ticks so a contact flickering on and off can't snap the
//! view around.

use crate::config::LanderConfig;
use crate::rocket::{ContactOverlap, Rocket, RocketState};
use crate::vec3ext::Vec3Ext;
use bevy::math::FloatExt;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

/// Per-camera follow state: the lerp rate actually applied last tick.
#[derive(Component, Debug)]
pub struct ChaseCamera {
    pub applied_rate: f32,
}

pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            setup_chase_camera.after(crate::config::load_lander_config),
        )
        .add_systems(Update, chase_camera_system);
    }
}

/// Spawn the 2D camera already sitting at its resting offset.
pub fn setup_chase_camera(mut commands: Commands, config: Res<LanderConfig>) {
    commands.spawn((
        Camera2d,
        ChaseCamera {
            applied_rate: config.flight_lerp_rate,
        },
        Transform::from_translation(config.camera_offset_vec()),
    ));
}

/// Pick the base lerp rate for the rocket's current situation.
///
/// Death wins over collision: a wreck resting on the ground uses the explosion
/// rate, not the collision rate.
pub fn select_lerp_rate(state: RocketState, in_collision: bool, config: &LanderConfig) -> f32 {
    if state == RocketState::Dead {
        config.explosion_lerp_rate
    } else if in_collision {
        config.collision_lerp_rate
    } else {
        config.flight_lerp_rate
    }
}

/// Smooth the applied rate between ticks.
///
/// Takes the minimum of the newly selected rate and a tiny interpolation from
/// the previous applied rate toward it: dropping to a slower rate is
/// immediate, climbing back to a faster one is gradual.
pub fn smooth_lerp_rate(previous: f32, selected: f32, smoothing: f32) -> f32 {
    selected.min(previous.lerp(selected, smoothing))
}

/// Compute the camera target for this tick.
///
/// Normally the rocket position plus the fixed offset plus a velocity lead
/// (planar only — the depth axis never leads).  Once the rocket is dead the
/// lead is dropped and the target backs further out along the depth offset.
pub fn chase_target(
    rocket_pos: Vec3,
    velocity: Vec2,
    state: RocketState,
    config: &LanderConfig,
) -> Vec3 {
    let offset = config.camera_offset_vec();
    let mut target = rocket_pos + offset;

    if state == RocketState::Dead {
        target += offset.hadamard(Vec3::new(0.0, 0.0, config.death_depth_pushback));
    } else {
        let lead = velocity * config.camera_velocity_lead_vec();
        target += lead.extend(0.0);
    }
    target
}

/// Reposition the camera toward this tick's target.
#[allow(clippy::type_complexity)]
pub fn chase_camera_system(
    q_rocket: Query<
        (&Transform, &Velocity, &RocketState, &ContactOverlap),
        (With<Rocket>, Without<ChaseCamera>),
    >,
    mut q_camera: Query<(&mut Transform, &mut ChaseCamera)>,
    config: Res<LanderConfig>,
) {
    let Ok((rocket_transform, velocity, state, overlap)) = q_rocket.single() else {
        return;
    };
    let Ok((mut camera_transform, mut camera)) = q_camera.single_mut() else {
        return;
    };

    let target = chase_target(
        rocket_transform.translation,
        velocity.linvel,
        *state,
        &config,
    );
    if target.is_non_finite() {
        warn!("camera target is non-finite; holding position");
        return;
    }

    let selected = select_lerp_rate(*state, overlap.is_in_collision(), &config);
    let rate = smooth_lerp_rate(camera.applied_rate, selected, config.lerp_rate_smoothing);

    camera_transform.translation = camera_transform.translation.lerp(target, rate);
    camera.applied_rate = rate;
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LanderConfig {
        LanderConfig::default()
    }

    // ── select_lerp_rate ──────────────────────────────────────────────────────

    #[test]
    fn rate_selection_by_situation() {
        let config = config();
        assert_eq!(
            select_lerp_rate(RocketState::Alive, false, &config),
            config.flight_lerp_rate
        );
        assert_eq!(
            select_lerp_rate(RocketState::Alive, true, &config),
            config.collision_lerp_rate
        );
        // Death wins even while the wreck is in contact with the ground.
        assert_eq!(
            select_lerp_rate(RocketState::Dead, true, &config),
            config.explosion_lerp_rate
        );
        assert_eq!(
            select_lerp_rate(RocketState::WaitingToFinish, true, &config),
            config.collision_lerp_rate
        );
    }

    // ── smooth_lerp_rate ──────────────────────────────────────────────────────

    #[test]
    fn dropping_to_a_slower_rate_is_immediate() {
        let smoothed = smooth_lerp_rate(0.7, 0.3, 0.001);
        assert_eq!(smoothed, 0.3);
    }

    #[test]
    fn climbing_to_a_faster_rate_is_gradual() {
        let config = config();
        let smoothed = smooth_lerp_rate(0.3, 0.7, config.lerp_rate_smoothing);
        // Bounded by one smoothing step above the previous rate, far below the
        // newly selected rate.
        let step_bound = 0.3 + (0.7 - 0.3) * config.lerp_rate_smoothing + 1e-6;
        assert!(smoothed <= step_bound, "rate jumped: {smoothed}");
        assert!(smoothed > 0.3, "rate must still climb");
    }

    #[test]
    fn rate_converges_to_selected_over_many_ticks() {
        let config = config();
        let mut rate = config.collision_lerp_rate;
        for _ in 0..10_000 {
            rate = smooth_lerp_rate(rate, config.flight_lerp_rate, config.lerp_rate_smoothing);
        }
        assert!((rate - config.flight_lerp_rate).abs() < 0.01);
    }

    #[test]
    fn collision_flip_changes_applied_rate_smoothly() {
        let config = config();
        // Steady flight, then a one-tick collision, then flight again.
        let mut rate = config.flight_lerp_rate;
        rate = smooth_lerp_rate(rate, config.collision_lerp_rate, config.lerp_rate_smoothing);
        assert_eq!(rate, config.collision_lerp_rate, "slow-down is instant");

        let after_flip = smooth_lerp_rate(rate, config.flight_lerp_rate, config.lerp_rate_smoothing);
        let max_climb = (config.flight_lerp_rate - rate) * config.lerp_rate_smoothing + 1e-6;
        assert!(
            after_flip - rate <= max_climb,
            "recovery must be bounded by the smoothing step"
        );
    }

    // ── chase_target ──────────────────────────────────────────────────────────

    #[test]
    fn flight_target_leads_with_planar_velocity() {
        let config = config();
        let target = chase_target(
            Vec3::new(10.0, 20.0, 0.0),
            Vec2::new(50.0, -30.0),
            RocketState::Alive,
            &config,
        );
        let offset = config.camera_offset_vec();
        let lead = Vec2::new(50.0, -30.0) * config.camera_velocity_lead_vec();
        assert_eq!(target, Vec3::new(10.0, 20.0, 0.0) + offset + lead.extend(0.0));
        // The depth axis never takes velocity lead.
        assert_eq!(target.z, offset.z);
    }

    #[test]
    fn death_target_drops_lead_and_pushes_back_in_depth() {
        let config = config();
        let target = chase_target(
            Vec3::ZERO,
            Vec2::new(999.0, 999.0),
            RocketState::Dead,
            &config,
        );
        let offset = config.camera_offset_vec();
        assert_eq!(target.x, offset.x, "velocity lead is dropped on death");
        assert_eq!(target.y, offset.y);
        assert_eq!(target.z, offset.z * (1.0 + config.death_depth_pushback));
    }

    // ── chase_camera_system ───────────────────────────────────────────────────

    #[test]
    fn camera_moves_toward_the_target_each_tick() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(LanderConfig::default());
        app.add_systems(Update, chase_camera_system);

        app.world_mut().spawn((
            Rocket,
            RocketState::Alive,
            ContactOverlap::default(),
            Velocity::zero(),
            Transform::from_xyz(100.0, 0.0, 0.0),
        ));
        let camera = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 0.0, 0.0),
                ChaseCamera { applied_rate: 0.7 },
            ))
            .id();

        let before = app.world().get::<Transform>(camera).unwrap().translation;
        app.update();
        let after = app.world().get::<Transform>(camera).unwrap().translation;

        let config = LanderConfig::default();
        let target = chase_target(
            Vec3::new(100.0, 0.0, 0.0),
            Vec2::ZERO,
            RocketState::Alive,
            &config,
        );
        assert!(
            after.distance(target) < before.distance(target),
            "camera must close on the target"
        );
    }
}
