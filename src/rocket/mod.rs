//! Rocket module: flight control, life-cycle sequencing, and thrust audio.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | ECS components (`Rocket`, `RocketState`, `ContactOverlap`) and resources (`ControlIntent`, `ScheduledChecks`), plus the domain contact messages |
//! | [`control`] | Input systems: keyboard/gamepad → intent, per-tick gravity/thrust/rotation |
//! | [`lifecycle`] | Collision classification, landing/death sequences, delayed outcome checks |
//! | [`audio`] | Round-robin thrust-audio slot pool and volume fades |
//!
//! All public items are re-exported at this level so that the rest of the crate
//! can use flat `crate::rocket::*` imports without knowing the sub-module
//! layout.

pub mod audio;
pub mod control;
pub mod lifecycle;
pub mod state;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use audio::{play_cue, RocketAudio, ThrustAudioBank, VolumeFade};
pub use control::{
    apply_control_system, control_intent_clear_system, gamepad_connection_system,
    gamepad_to_intent_system, gravity_force, keyboard_to_intent_system,
};
pub use lifecycle::{
    classify_contact, rocket_contact_intake_system, rocket_outcome_system,
    scheduled_checks_system, tick_scheduled, ContactCategory,
};
pub use state::{
    ContactOverlap, ContactPhase, ContactSurface, ControlIntent, LaunchPose, OutcomeAction,
    OutcomeCheck, PreferredGamepad, Rocket, RocketCollider, RocketContact, RocketResetHook,
    RocketState, ScheduledChecks, Surface, TouchPoint,
};

// ── Rocket spawn ──────────────────────────────────────────────────────────────

use crate::constants::{
    GEAR_DROP, GEAR_HALF_EXTENT, GEAR_SPREAD, ROCKET_HULL_HALF_HEIGHT, ROCKET_HULL_RADIUS,
    ROCKET_MASS,
};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Spawn the rocket: a dynamic capsule hull with two massless landing-gear
/// foot colliders parented below it.
///
/// Gear feet are separate collider entities so pad contact can be classified
/// per touch point; they carry no mass of their own to keep the hull's mass
/// and centre of mass authoritative.
pub fn spawn_rocket(mut commands: Commands) {
    commands
        .spawn((
            Rocket,
            RocketState::default(),
            ContactOverlap::default(),
            LaunchPose {
                translation: Vec2::ZERO,
                rotation: 0.0,
            },
            RocketCollider::Hull,
            (
                RigidBody::Dynamic,
                Collider::capsule_y(ROCKET_HULL_HALF_HEIGHT, ROCKET_HULL_RADIUS),
                ColliderMassProperties::Mass(ROCKET_MASS),
                Velocity::zero(),
                ExternalForce::default(),
                ExternalImpulse::default(),
                ReadMassProperties::default(),
                LockedAxes::empty(),
                ActiveEvents::COLLISION_EVENTS,
            ),
            Sprite::from_color(
                Color::srgb(0.85, 0.85, 0.90),
                Vec2::new(
                    ROCKET_HULL_RADIUS * 2.0,
                    (ROCKET_HULL_HALF_HEIGHT + ROCKET_HULL_RADIUS) * 2.0,
                ),
            ),
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|parent| {
            for side in [-1.0_f32, 1.0] {
                parent.spawn((
                    RocketCollider::Gear,
                    Collider::cuboid(GEAR_HALF_EXTENT, GEAR_HALF_EXTENT),
                    ColliderMassProperties::Density(0.0),
                    ActiveEvents::COLLISION_EVENTS,
                    Transform::from_xyz(side * GEAR_SPREAD, GEAR_DROP, 0.0),
                ));
            }
        });

    info!("rocket spawned");
}

/// One-shot system handed to the level controller as the reload completion
/// callback: restore the launch pose and still the body.  The level load that
/// follows re-initializes the life-cycle state itself.
#[allow(clippy::type_complexity)]
pub fn reset_rocket_pose(
    mut q: Query<
        (
            &LaunchPose,
            &mut Transform,
            &mut Velocity,
            &mut ExternalForce,
            &mut ExternalImpulse,
            &mut LockedAxes,
        ),
        With<Rocket>,
    >,
) {
    let Ok((pose, mut transform, mut velocity, mut force, mut impulse, mut locked)) =
        q.single_mut()
    else {
        return;
    };

    transform.translation = pose.translation.extend(transform.translation.z);
    transform.rotation = Quat::from_rotation_z(pose.rotation);
    *velocity = Velocity::zero();
    *force = ExternalForce::default();
    *impulse = ExternalImpulse::default();
    *locked = LockedAxes::empty();
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct RocketPlugin;

impl Plugin for RocketPlugin {
    fn build(&self, app: &mut App) {
        let reset_hook = app.world_mut().register_system(reset_rocket_pose);

        app.insert_resource(RocketResetHook(reset_hook))
            .init_resource::<ControlIntent>()
            .init_resource::<PreferredGamepad>()
            .init_resource::<ScheduledChecks>()
            .init_resource::<ThrustAudioBank>()
            .add_message::<RocketContact>()
            .add_systems(
                Startup,
                (
                    spawn_rocket.after(crate::config::load_lander_config),
                    audio::setup_thrust_audio.after(crate::config::load_lander_config),
                ),
            )
            .add_systems(
                Update,
                (
                    control::control_intent_clear_system,
                    control::gamepad_connection_system,
                    control::keyboard_to_intent_system,
                    control::gamepad_to_intent_system,
                    control::apply_control_system,
                    lifecycle::rocket_contact_intake_system,
                    lifecycle::rocket_outcome_system,
                    lifecycle::scheduled_checks_system,
                    audio::thrust_audio_fade_system,
                    audio::sync_thrust_audio_system,
                )
                    .chain(),
            );
    }
}

