//! Collision classification and rocket outcome sequencing.
//!
//! ## Pipeline
//!
//! 1. [`rocket_contact_intake_system`] — translates Rapier collision events
//!    (plus contact-manifold points) into domain [`RocketContact`] messages.
//!    Tests write the messages directly and skip this step.
//! 2. [`rocket_outcome_system`] — classifies each contact and runs the
//!    level-complete / death sequences; maintains the overlap counter.
//! 3. [`scheduled_checks_system`] — central per-tick scheduler for the delayed
//!    finish/death follow-ups.  A check re-validates the rocket state when it
//!    comes due, so a later transition silently invalidates an earlier
//!    scheduled action — there is no explicit cancel token.

use super::audio::{play_cue, RocketAudio, ThrustAudioBank};
use super::state::{
    ContactOverlap, ContactPhase, ContactSurface, OutcomeAction, OutcomeCheck, Rocket,
    RocketCollider, RocketContact, RocketResetHook, RocketState, ScheduledChecks, Surface,
    TouchPoint,
};
use crate::config::LanderConfig;
use crate::level::LevelChangeRequest;
use crate::particles::spawn_explosion_particles;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Classification ────────────────────────────────────────────────────────────

/// How a single collision event is handled.  Derived per event, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactCategory {
    /// Launch-pad structure; ignored.
    Friendly,
    /// Finish-zone contact entirely on landing gear: the level is complete.
    FinishGood,
    /// Finish-zone contact with at least one non-gear touch point: a crash.
    FinishBad,
    /// Anything else: a crash.
    Obstacle,
}

/// Classify one collision by the touched surface and the rocket-side tag of
/// every contact point.
///
/// A finish-pad landing is clean only when *every* contact point is landing
/// gear; a single hull touch makes it a crash.  An empty point set therefore
/// classifies as clean — see `no_contact_points_counts_as_clean` below, which
/// pins that boundary behaviour.
pub fn classify_contact(surface: ContactSurface, points: &[TouchPoint]) -> ContactCategory {
    match surface {
        ContactSurface::Friendly => ContactCategory::Friendly,
        ContactSurface::FinishPad => {
            if points.iter().all(|p| p.tag == RocketCollider::Gear) {
                ContactCategory::FinishGood
            } else {
                ContactCategory::FinishBad
            }
        }
        ContactSurface::Obstacle => ContactCategory::Obstacle,
    }
}

// ── Contact intake ────────────────────────────────────────────────────────────

/// Translate Rapier collision events on any rocket collider into
/// [`RocketContact`] messages.
///
/// Enter events carry the contact-manifold points (world space, tagged by the
/// rocket part that touched).  When the manifold is already gone by the time
/// the event is read, the collider's own position stands in so the death
/// sequence still has an impulse application point.
pub fn rocket_contact_intake_system(
    mut collision_events: MessageReader<CollisionEvent>,
    rapier_context: ReadRapierContext,
    q_rocket_parts: Query<(&RocketCollider, &GlobalTransform)>,
    q_surfaces: Query<&Surface>,
    mut contacts: MessageWriter<RocketContact>,
) {
    for event in collision_events.read() {
        let (e1, e2, phase) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2, ContactPhase::Enter),
            CollisionEvent::Stopped(e1, e2, _) => (*e1, *e2, ContactPhase::Exit),
        };

        let (rocket_part, other) = if q_rocket_parts.contains(e1) {
            (e1, e2)
        } else if q_rocket_parts.contains(e2) {
            (e2, e1)
        } else {
            continue;
        };
        if q_rocket_parts.contains(other) {
            continue;
        }

        let Ok((tag, part_transform)) = q_rocket_parts.get(rocket_part) else {
            continue;
        };

        let surface = match q_surfaces.get(other) {
            Ok(Surface::Friendly) => ContactSurface::Friendly,
            Ok(Surface::FinishPad) => ContactSurface::FinishPad,
            Err(_) => ContactSurface::Obstacle,
        };

        let mut points = Vec::new();
        if phase == ContactPhase::Enter {
            if let Ok(rapier) = rapier_context.single() {
                if let Some(pair) = rapier.contact_pair(rocket_part, other) {
                    let rocket_is_first = pair.collider1() == Some(rocket_part);
                    for manifold in pair.manifolds() {
                        for point in manifold.points() {
                            let local = if rocket_is_first {
                                point.local_p1()
                            } else {
                                point.local_p2()
                            };
                            let world =
                                part_transform.transform_point(local.extend(0.0)).truncate();
                            points.push(TouchPoint {
                                tag: *tag,
                                position: world,
                            });
                        }
                    }
                }
            }
            if points.is_empty() {
                // Manifold already resolved; the collider position keeps the
                // touch point tagged and placed well enough for the impulse.
                points.push(TouchPoint {
                    tag: *tag,
                    position: part_transform.translation().truncate(),
                });
            }
        }

        contacts.write(RocketContact {
            phase,
            surface,
            points,
        });
    }
}

// ── Outcome sequencing ────────────────────────────────────────────────────────

/// Consume [`RocketContact`] messages: classify enters, dispatch the
/// level-complete or death sequence, and keep the overlap counter current.
///
/// The counter moves on **every** enter/exit regardless of classification or
/// life-cycle state, so the camera's "in collision" signal stays truthful even
/// while the wreck is resting on the ground.
#[allow(clippy::too_many_arguments)]
pub fn rocket_outcome_system(
    mut contacts: MessageReader<RocketContact>,
    mut q: Query<
        (
            &mut RocketState,
            &mut ContactOverlap,
            &mut LockedAxes,
            &mut ExternalImpulse,
            &Velocity,
            &Transform,
        ),
        With<Rocket>,
    >,
    mut bank: ResMut<ThrustAudioBank>,
    mut checks: ResMut<ScheduledChecks>,
    audio: Option<Res<RocketAudio>>,
    mut commands: Commands,
    config: Res<LanderConfig>,
) {
    let Ok((mut state, mut overlap, mut locked, mut impulse, velocity, transform)) =
        q.single_mut()
    else {
        return;
    };

    for contact in contacts.read() {
        match contact.phase {
            ContactPhase::Enter => {
                match classify_contact(contact.surface, &contact.points) {
                    ContactCategory::Friendly => {}
                    ContactCategory::FinishGood => complete_level(
                        &mut state,
                        &mut bank,
                        &mut checks,
                        audio.as_deref(),
                        &mut commands,
                        &config,
                    ),
                    ContactCategory::FinishBad | ContactCategory::Obstacle => kill_rocket(
                        &mut state,
                        &mut locked,
                        &mut impulse,
                        velocity,
                        transform,
                        contact.points.first().map(|p| p.position),
                        &mut bank,
                        &mut checks,
                        audio.as_deref(),
                        &mut commands,
                        &config,
                    ),
                }
                overlap.enter();
            }
            ContactPhase::Exit => overlap.exit(),
        }
    }
}

/// Level-complete sequence.  No-op unless the rocket is still `Alive`, so a
/// crash that arrives in the same batch as a clean touchdown wins.
fn complete_level(
    state: &mut RocketState,
    bank: &mut ThrustAudioBank,
    checks: &mut ScheduledChecks,
    audio: Option<&RocketAudio>,
    commands: &mut Commands,
    config: &LanderConfig,
) {
    if *state != RocketState::Alive {
        return;
    }
    *state = RocketState::WaitingToFinish;
    info!("clean touchdown; advancing in {:.1}s", config.finish_delay);

    bank.stop_all();
    if let Some(audio) = audio {
        play_cue(commands, &audio.finish_cue);
    }

    checks.0.push(OutcomeCheck {
        remaining: config.finish_delay,
        expect: RocketState::WaitingToFinish,
        action: OutcomeAction::AdvanceLevel,
    });
}

/// Death sequence.  No-op if already `Dead`, which absorbs the repeat contacts
/// a tumbling wreck generates while the reload check is pending.
#[allow(clippy::too_many_arguments)]
fn kill_rocket(
    state: &mut RocketState,
    locked: &mut LockedAxes,
    impulse: &mut ExternalImpulse,
    velocity: &Velocity,
    transform: &Transform,
    contact_point: Option<Vec2>,
    bank: &mut ThrustAudioBank,
    checks: &mut ScheduledChecks,
    audio: Option<&RocketAudio>,
    commands: &mut Commands,
    config: &LanderConfig,
) {
    if *state == RocketState::Dead {
        return;
    }
    *state = RocketState::Dead;
    info!("rocket destroyed; reloading in {:.1}s", config.death_delay);

    // Let the wreck tumble freely.
    *locked = LockedAxes::empty();

    let center = transform.translation.truncate();
    let point = contact_point.unwrap_or(center);
    let scale = (velocity.linvel.length() * config.explosion_velocity_multiplier)
        .max(config.min_explosion_multiplier);
    let mut direction = center - point;
    if direction.length_squared() < 1e-6 {
        direction = Vec2::Y;
    }
    let burst = ExternalImpulse::at_point(
        direction.normalize() * config.explosion_base_force * scale,
        point,
        center,
    );
    impulse.impulse += burst.impulse;
    impulse.torque_impulse += burst.torque_impulse;

    spawn_explosion_particles(commands, point);

    bank.stop_all();
    if let Some(audio) = audio {
        play_cue(commands, &audio.death_cue);
    }

    checks.0.push(OutcomeCheck {
        remaining: config.death_delay,
        expect: RocketState::Dead,
        action: OutcomeAction::ReloadLevel,
    });
}

// ── Scheduled checks ──────────────────────────────────────────────────────────

/// Advance every pending check by `dt`; return the actions whose state guard
/// still holds.  Due checks whose guard fails are dropped without acting.
pub fn tick_scheduled(
    checks: &mut Vec<OutcomeCheck>,
    dt: f32,
    state: RocketState,
) -> Vec<OutcomeAction> {
    let mut due = Vec::new();
    checks.retain_mut(|check| {
        check.remaining -= dt;
        if check.remaining > 0.0 {
            return true;
        }
        if state == check.expect {
            due.push(check.action);
        } else {
            info!(
                "scheduled {:?} discarded: rocket is {:?}, expected {:?}",
                check.action, state, check.expect
            );
        }
        false
    });
    due
}

/// Tick the scheduler and turn due-and-valid outcomes into level requests.
pub fn scheduled_checks_system(
    time: Res<Time>,
    mut checks: ResMut<ScheduledChecks>,
    q_state: Query<&RocketState, With<Rocket>>,
    reset_hook: Res<RocketResetHook>,
    mut requests: MessageWriter<LevelChangeRequest>,
) {
    let Ok(state) = q_state.single() else {
        return;
    };
    for action in tick_scheduled(&mut checks.0, time.delta_secs(), *state) {
        match action {
            OutcomeAction::AdvanceLevel => {
                requests.write(LevelChangeRequest::advance());
            }
            OutcomeAction::ReloadLevel => {
                requests.write(LevelChangeRequest::reload(reset_hook.0));
            }
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
