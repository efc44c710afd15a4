//! Headless end-to-end tests for the rocket life-cycle and level transitions.
//!
//! These tests use [`MinimalPlugins`] — no window, no rendering, no physics
//! solver — and drive the logic pipeline through domain messages, exactly the
//! seams the real game uses between Rapier and the gameplay systems.
//!
//! Covered scenarios:
//! 1. Clean landing → finish wait → fade-out → the next level loads.
//! 2. A crash inside the finish window cancels the pending level advance and
//!    reloads the same level instead.
//! 3. Thrust audio is fade-stopped by the landing sequence.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::thread::sleep;
use std::time::Duration;

use perigee::animation::{screen_fade_system, FadePhase, ScreenFade};
use perigee::config::LanderConfig;
use perigee::level::{
    fade_out_completed_system, find_level, level_change_request_system, CurrentLevel,
    FadeOutCompleted, LevelChangeRequest, LevelChanger,
};
use perigee::rocket::{
    apply_control_system, reset_rocket_pose, rocket_outcome_system, scheduled_checks_system,
    ContactOverlap, ContactPhase, ContactSurface, ControlIntent, LaunchPose, Rocket,
    RocketContact, RocketResetHook, RocketState, ScheduledChecks, ThrustAudioBank, TouchPoint,
};

/// Outcome delay used by the transition tests; long enough that a frame or
/// two of real test time cannot consume it by accident.
const DELAY: f32 = 0.2;

/// Sleep comfortably past [`DELAY`] so a pending check comes due.
fn wait_out_delay() {
    sleep(Duration::from_millis(300));
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a headless app wiring the full logic pipeline in game order.
fn build_flight_app(finish_delay: f32, death_delay: f32) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);

    app.add_message::<RocketContact>();
    app.add_message::<LevelChangeRequest>();
    app.add_message::<FadeOutCompleted>();

    let config = LanderConfig {
        finish_delay,
        death_delay,
        ..Default::default()
    };
    app.insert_resource(config);
    app.insert_resource(ControlIntent::default());
    app.insert_resource(ThrustAudioBank::default());
    app.insert_resource(ScheduledChecks::default());
    app.insert_resource(LevelChanger {
        next_level: "rim".to_string(),
        level_override: None,
        callback: None,
    });
    app.insert_resource(CurrentLevel("gorge".to_string()));

    let reset_hook = app.world_mut().register_system(reset_rocket_pose);
    app.insert_resource(RocketResetHook(reset_hook));

    app.add_systems(
        Update,
        (
            apply_control_system,
            rocket_outcome_system,
            scheduled_checks_system,
            level_change_request_system,
            screen_fade_system,
            fade_out_completed_system,
        )
            .chain(),
    );

    let start = find_level("gorge").start;
    app.world_mut().spawn((
        Rocket,
        RocketState::Alive,
        ContactOverlap::default(),
        LaunchPose {
            translation: start,
            rotation: 0.0,
        },
        Transform::from_translation(start.extend(0.0)),
        Velocity::zero(),
        ExternalForce::default(),
        ExternalImpulse::default(),
        LockedAxes::empty(),
        ReadMassProperties::default(),
    ));

    // Fade fast enough to complete within a single tick.
    app.world_mut().spawn((
        ScreenFade {
            phase: FadePhase::Idle,
            alpha: 0.0,
            speed: 1.0e6,
        },
        BackgroundColor(Color::BLACK.with_alpha(0.0)),
    ));

    app
}

fn send_contact(app: &mut App, surface: ContactSurface, points: Vec<TouchPoint>) {
    app.world_mut()
        .resource_mut::<Messages<RocketContact>>()
        .write(RocketContact {
            phase: ContactPhase::Enter,
            surface,
            points,
        });
}

fn rocket_state(app: &mut App) -> RocketState {
    let world = app.world_mut();
    let mut query = world.query_filtered::<&RocketState, With<Rocket>>();
    *query.single(world).unwrap()
}

fn current_level(app: &App) -> String {
    app.world().resource::<CurrentLevel>().0.clone()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// A clean gear-only landing waits out the finish delay, fades the screen,
/// and loads the configured next level with the rocket freshly alive on its
/// launch pad.
#[test]
fn clean_landing_advances_to_the_next_level() {
    let mut app = build_flight_app(DELAY, DELAY);

    send_contact(
        &mut app,
        ContactSurface::FinishPad,
        vec![
            TouchPoint::gear(Vec2::new(-5.0, -86.0)),
            TouchPoint::gear(Vec2::new(5.0, -86.0)),
        ],
    );
    app.update();
    assert_eq!(rocket_state(&mut app), RocketState::WaitingToFinish);
    assert_eq!(current_level(&app), "gorge", "advance waits for the delay");

    // The check comes due, requests the advance, the fade completes, and the
    // next level loads — all within one frame once the delay has elapsed.
    wait_out_delay();
    app.update();

    assert_eq!(current_level(&app), "rim");
    assert_eq!(rocket_state(&mut app), RocketState::Alive);

    let rim_start = find_level("rim").start;
    let world = app.world_mut();
    let mut query = world.query_filtered::<&Transform, With<Rocket>>();
    let transform = query.single(world).unwrap();
    assert_eq!(transform.translation.truncate(), rim_start);
}

/// A crash before the finish delay elapses invalidates the pending advance:
/// the same level reloads and the advance never fires afterwards.
#[test]
fn crash_inside_the_finish_window_cancels_the_advance() {
    let mut app = build_flight_app(DELAY, DELAY);

    send_contact(
        &mut app,
        ContactSurface::FinishPad,
        vec![TouchPoint::gear(Vec2::ZERO)],
    );
    app.update();
    assert_eq!(rocket_state(&mut app), RocketState::WaitingToFinish);

    // The rocket tips over into an obstacle while waiting.
    send_contact(
        &mut app,
        ContactSurface::Obstacle,
        vec![TouchPoint::hull(Vec2::ZERO)],
    );
    app.update();
    assert_eq!(rocket_state(&mut app), RocketState::Dead);

    // Both checks come due together: the stale finish check is discarded by
    // its state guard, the death check reloads the active level.
    wait_out_delay();
    app.update();

    assert_eq!(current_level(&app), "gorge", "advance must never fire");
    assert_eq!(rocket_state(&mut app), RocketState::Alive);
    assert!(app.world().resource::<ScheduledChecks>().0.is_empty());

    // Nothing left pending that could still advance the level later.
    app.update();
    app.update();
    assert_eq!(current_level(&app), "gorge");
}

/// The landing sequence fade-stops every thrust-audio slot.
#[test]
fn landing_fade_stops_the_thrust_audio() {
    let mut app = build_flight_app(10.0, 10.0);

    // Burn the engine for a frame so the active slot is playing.
    app.insert_resource(ControlIntent {
        vertical: 1.0,
        ..Default::default()
    });
    app.update();
    assert!(app
        .world()
        .resource::<ThrustAudioBank>()
        .active_slot()
        .playing);
    app.insert_resource(ControlIntent::default());

    send_contact(
        &mut app,
        ContactSurface::FinishPad,
        vec![TouchPoint::gear(Vec2::ZERO)],
    );
    app.update();
    assert_eq!(rocket_state(&mut app), RocketState::WaitingToFinish);

    // Drain the fades; every slot must come to rest stopped and silent.
    let rate = LanderConfig::default().volume_fade_rate;
    let mut bank = app.world_mut().resource_mut::<ThrustAudioBank>();
    for _ in 0..((1.0 / rate) as usize + 2) {
        bank.tick(rate);
    }
    assert!(bank.slots().iter().all(|slot| !slot.playing));
    assert!(bank.slots().iter().all(|slot| slot.volume == 0.0));
}
