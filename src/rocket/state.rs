//! Rocket components, resources, and domain messages.
//!
//! All ECS state that describes the rocket lives here.  Systems that mutate it
//! are in the sibling modules:
//! - [`super::control`] — input + per-tick force application
//! - [`super::lifecycle`] — collision classification + outcome sequencing
//! - [`super::audio`] — thrust-audio slot pool

use bevy::prelude::*;

// ── Components ─────────────────────────────────────────────────────────────────

/// Marker component for the rocket body entity.
#[derive(Component)]
pub struct Rocket;

/// Rocket life-cycle state.
///
/// Created at `Alive`.  A clean pad landing moves it to `WaitingToFinish`; any
/// bad contact moves it to `Dead`.  Neither non-alive state ever transitions
/// back by itself — only a level load re-initializes the rocket to `Alive`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RocketState {
    #[default]
    Alive,
    /// Touched down cleanly; holding for the level-advance check.
    WaitingToFinish,
    Dead,
}

/// Launch-pad pose the rocket returns to on reset and reload.
#[derive(Component, Debug, Clone, Copy)]
pub struct LaunchPose {
    pub translation: Vec2,
    /// Rotation around the forward (Z) axis, radians.
    pub rotation: f32,
}

/// Count of colliders currently touching the rocket.
///
/// Incremented on every contact-enter and decremented on every contact-exit,
/// regardless of how the contact was classified.  Read by the chase camera as
/// a boolean "in collision" signal.
#[derive(Component, Debug, Default)]
pub struct ContactOverlap(pub u32);

impl ContactOverlap {
    #[inline]
    pub fn is_in_collision(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn enter(&mut self) {
        self.0 += 1;
    }

    /// Decrement, saturating at zero.  An exit without a matching enter means
    /// an event was lost somewhere upstream; absorb it rather than wrap.
    pub fn exit(&mut self) {
        if self.0 == 0 {
            warn!("contact exit with no matching enter; overlap stays 0");
            return;
        }
        self.0 -= 1;
    }
}

/// Tags one of the rocket's collider entities as a safe or unsafe touch point.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocketCollider {
    /// Landing-gear foot: safe to touch the pad with.
    Gear,
    /// Everything else on the rocket; pad contact here is a crash.
    Hull,
}

/// Marks world geometry with special collision meaning.  Colliders without
/// this component are obstacles.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Launch-pad structure; contact is ignored.
    Friendly,
    /// Landing pad; gear-only contact completes the level.
    FinishPad,
}

// ── Resources ──────────────────────────────────────────────────────────────────

/// Aggregated control input for the current frame, derived from all devices.
///
/// Input systems (keyboard, gamepad) write to this resource each frame after
/// it is cleared.  [`super::control::apply_control_system`] reads it and
/// applies the corresponding physics writes.  Tests populate this directly to
/// fly the rocket without a real input device.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct ControlIntent {
    /// Thrust axis in [-1, 1]; only positive values produce lift.
    pub vertical: f32,
    /// Roll axis in [-1, 1]; positive tips the rocket clockwise.
    pub horizontal: f32,
    /// Snap back to the launch pose this frame (debug/practice reset).
    pub reset: bool,
}

/// Tracks the most recently connected gamepad so that accidental HID devices
/// exposed as joysticks don't hijack input.
///
/// Updated by [`super::control::gamepad_connection_system`].  Always prefers
/// the *last* connected gamepad; cleared when that gamepad disconnects.
#[derive(Resource, Default)]
pub struct PreferredGamepad(pub Option<Entity>);

/// Delayed outcome checks waiting to fire.
///
/// Each record re-validates the rocket state when due; a record whose guard no
/// longer holds is discarded without acting, which is how a death inside the
/// finish window silently cancels the level advance.
#[derive(Resource, Default, Debug)]
pub struct ScheduledChecks(pub Vec<OutcomeCheck>);

/// One pending outcome: fire `action` after `remaining` seconds, but only if
/// the rocket is still in the `expect` state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeCheck {
    pub remaining: f32,
    pub expect: RocketState,
    pub action: OutcomeAction,
}

/// What a due-and-valid outcome check asks the level controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeAction {
    AdvanceLevel,
    ReloadLevel,
}

/// One-shot system that restores the rocket's launch pose, registered at
/// plugin build time and handed to the level controller as the reload
/// completion callback.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RocketResetHook(pub bevy::ecs::system::SystemId);

// ── Domain messages ────────────────────────────────────────────────────────────

/// A rocket collision event translated out of the physics engine, or written
/// directly by tests.
#[derive(Message, Debug, Clone)]
pub struct RocketContact {
    pub phase: ContactPhase,
    pub surface: ContactSurface,
    /// Every contact point of the collision, tagged by the rocket-side part
    /// it touched with.  Empty when the physics engine had no manifold for
    /// the pair (enter and exit events both allow this).
    pub points: Vec<TouchPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// What the rocket collided with, from the touched collider's [`Surface`] tag
/// (absent tag ⇒ `Obstacle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSurface {
    Friendly,
    FinishPad,
    Obstacle,
}

/// A single contact point: which rocket part touched, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub tag: RocketCollider,
    pub position: Vec2,
}

impl TouchPoint {
    pub fn gear(position: Vec2) -> Self {
        Self {
            tag: RocketCollider::Gear,
            position,
        }
    }

    pub fn hull(position: Vec2) -> Self {
        Self {
            tag: RocketCollider::Hull,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_counts_enters_minus_exits() {
        let mut overlap = ContactOverlap::default();
        overlap.enter();
        overlap.enter();
        overlap.exit();
        assert_eq!(overlap.0, 1);
        assert!(overlap.is_in_collision());
        overlap.exit();
        assert_eq!(overlap.0, 0);
        assert!(!overlap.is_in_collision());
    }

    #[test]
    fn overlap_never_goes_negative() {
        let mut overlap = ContactOverlap::default();
        overlap.exit();
        overlap.exit();
        assert_eq!(overlap.0, 0);
        // Interleavings stay consistent after an absorbed underflow.
        overlap.enter();
        assert_eq!(overlap.0, 1);
    }
}
