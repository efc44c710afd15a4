//! Rocket input and per-tick flight systems.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`control_intent_clear_system`] — resets `ControlIntent` and `ExternalForce` to zero.
//! 2. [`keyboard_to_intent_system`] — translates thrust/roll keys into `ControlIntent`.
//! 3. [`gamepad_to_intent_system`] — translates the gamepad left stick into `ControlIntent`.
//! 4. [`apply_control_system`] — converts `ControlIntent` into physics writes and
//!    drives the thrust-audio slot pool.
//!
//! The **input abstraction layer** (`ControlIntent`) makes the flight logic fully
//! testable: tests populate the resource directly and run only `apply_control_system`.

use super::audio::ThrustAudioBank;
use super::state::{ControlIntent, LaunchPose, PreferredGamepad, Rocket, RocketState};
use crate::config::LanderConfig;
use bevy::input::gamepad::{GamepadAxis, GamepadConnection, GamepadConnectionEvent};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

/// Clear `ExternalForce` and `ControlIntent` to zero at the start of every frame.
///
/// Must run before any system that writes to `ControlIntent` or accumulates
/// forces.  Running both resets here ensures a single ordered dependency.
pub fn control_intent_clear_system(
    mut q: Query<&mut ExternalForce, With<Rocket>>,
    mut intent: ResMut<ControlIntent>,
) {
    if let Ok(mut force) = q.single_mut() {
        force.force = Vec2::ZERO;
        force.torque = 0.0;
    }
    *intent = ControlIntent::default();
}

// ── Step 2a: Keyboard → Intent ────────────────────────────────────────────────

/// Translate thrust/roll keys into [`ControlIntent`].
///
/// - **W / ↑** → `vertical = 1.0`
/// - **S / ↓** → `vertical = −1.0` (no lift; keeps the axis symmetric)
/// - **A / ←** → `horizontal = −1.0` (tip counter-clockwise)
/// - **D / →** → `horizontal = +1.0` (tip clockwise)
/// - **Space** → `reset = true` (snap back to the launch pose)
pub fn keyboard_to_intent_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut intent: ResMut<ControlIntent>,
) {
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        intent.vertical = 1.0;
    } else if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        intent.vertical = -1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        intent.horizontal = -1.0;
    } else if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        intent.horizontal = 1.0;
    }
    if keys.just_pressed(KeyCode::Space) {
        intent.reset = true;
    }
}

// ── Step 2b: Gamepad connection ───────────────────────────────────────────────

/// Track gamepad connect / disconnect events and update [`PreferredGamepad`].
///
/// The most-recently-connected gamepad is always preferred, so a non-gamepad
/// HID device that enumerates first doesn't capture the controls.
pub fn gamepad_connection_system(
    mut events: MessageReader<GamepadConnectionEvent>,
    mut preferred: ResMut<PreferredGamepad>,
) {
    for event in events.read() {
        match &event.connection {
            GamepadConnection::Connected { .. } => {
                preferred.0 = Some(event.gamepad);
                info!("gamepad {:?} connected (now preferred)", event.gamepad);
            }
            GamepadConnection::Disconnected => {
                info!("gamepad {:?} disconnected", event.gamepad);
                if preferred.0 == Some(event.gamepad) {
                    preferred.0 = None;
                }
            }
        }
    }
}

// ── Step 2c: Gamepad → Intent ─────────────────────────────────────────────────

/// Translate the gamepad left stick into [`ControlIntent`].
///
/// Stick Y drives thrust, stick X drives roll; axes inside the dead zone leave
/// whatever the keyboard wrote untouched.  Does nothing when no gamepad is
/// connected ([`PreferredGamepad`] is `None`).
pub fn gamepad_to_intent_system(
    preferred: Res<PreferredGamepad>,
    gamepads: Query<&Gamepad>,
    mut intent: ResMut<ControlIntent>,
    config: Res<LanderConfig>,
) {
    let Some(gamepad_entity) = preferred.0 else {
        return;
    };
    let Ok(gamepad) = gamepads.get(gamepad_entity) else {
        return;
    };

    let lx = gamepad.get(GamepadAxis::LeftStickX).unwrap_or(0.0);
    let ly = gamepad.get(GamepadAxis::LeftStickY).unwrap_or(0.0);

    if ly.abs() >= config.gamepad_deadzone {
        intent.vertical = ly.clamp(-1.0, 1.0);
    }
    if lx.abs() >= config.gamepad_deadzone {
        intent.horizontal = lx.clamp(-1.0, 1.0);
    }
}

// ── Step 3: Apply intent → physics ────────────────────────────────────────────

/// Downward weight force for a body of `mass` under `accel` (negative = down).
#[inline]
pub fn gravity_force(mass: f32, accel: f32) -> Vec2 {
    Vec2::Y * mass * accel
}

/// Convert [`ControlIntent`] into physics writes on the rocket.
///
/// This is the **only** system that writes flight physics; all input systems
/// only write to `ControlIntent`.
///
/// Gravity is applied **every tick in every state** — a dead or finishing
/// rocket still falls.  Everything else is gated on `RocketState::Alive`:
///
/// | Intent field       | Effect                                                        |
/// |--------------------|---------------------------------------------------------------|
/// | `vertical > 0`     | `force += local_up × lift_multiplier × vertical`; fade the active audio slot in |
/// | `vertical ≤ 0`     | fade the active audio slot out and advance the round-robin    |
/// | `horizontal ≠ 0`   | freeze rotation, zero `angvel`, rotate around Z, unfreeze     |
/// | `reset`            | snap back to the launch pose, zero all velocity               |
///
/// The rotation freeze is asserted before and cleared after the manual
/// orientation write so the solver never fights it within the same tick.
pub fn apply_control_system(
    mut q: Query<
        (
            &RocketState,
            &LaunchPose,
            &mut Transform,
            &mut ExternalForce,
            &mut Velocity,
            &mut LockedAxes,
            &ReadMassProperties,
        ),
        With<Rocket>,
    >,
    intent: Res<ControlIntent>,
    mut bank: ResMut<ThrustAudioBank>,
    config: Res<LanderConfig>,
    time: Res<Time>,
) {
    let Ok((state, pose, mut transform, mut force, mut velocity, mut locked, mass_props)) =
        q.single_mut()
    else {
        return;
    };

    force.force += gravity_force(mass_props.mass, config.gravity_acceleration);

    if *state != RocketState::Alive {
        return;
    }

    if intent.vertical > 0.0 {
        let up = (transform.rotation * Vec3::Y).truncate();
        force.force += up * config.lift_multiplier * intent.vertical;
        bank.begin_thrust();
    } else {
        bank.release_thrust();
    }

    if intent.reset {
        transform.translation = pose.translation.extend(transform.translation.z);
        transform.rotation = Quat::from_rotation_z(pose.rotation);
        velocity.linvel = Vec2::ZERO;
        velocity.angvel = 0.0;
    } else if intent.horizontal != 0.0 {
        locked.insert(LockedAxes::ROTATION_LOCKED);
        velocity.angvel = 0.0;
        transform
            .rotate_z(config.rotation_multiplier * -intent.horizontal * time.delta_secs());
        locked.remove(LockedAxes::ROTATION_LOCKED);
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
