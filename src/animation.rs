//! Screen-fade rig and one-shot animation property setters.
//!
//! The fade is a fullscreen black UI node whose alpha is ramped by
//! [`screen_fade_system`].  Fade-out completion is announced with a
//! [`FadeOutCompleted`] message that the level controller listens for.
//!
//! [`FadeFloatSetter`] / [`FadeFlagSetter`] seed named parameters into the rig
//! exactly once after spawn, then remove themselves — initialization glue for
//! values that are authored on the entity rather than hard-wired in code.

use crate::config::LanderConfig;
use crate::level::FadeOutCompleted;
use bevy::prelude::*;

// ── Fade rig ──────────────────────────────────────────────────────────────────

/// Where the screen fade currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    #[default]
    Idle,
    /// Ramping alpha toward 1 (black); completion is announced.
    FadingOut,
    /// Ramping alpha toward 0 (clear).
    FadingIn,
}

/// Fullscreen fade overlay state.
#[derive(Component, Debug, Clone, Copy)]
pub struct ScreenFade {
    pub phase: FadePhase,
    /// Current overlay alpha, 0 (clear) to 1 (black).
    pub alpha: f32,
    /// Alpha change per second.
    pub speed: f32,
}

impl Default for ScreenFade {
    fn default() -> Self {
        Self {
            phase: FadePhase::Idle,
            alpha: 0.0,
            speed: crate::constants::FADE_SPEED,
        }
    }
}

impl ScreenFade {
    pub fn begin_fade_out(&mut self) {
        self.phase = FadePhase::FadingOut;
    }

    pub fn begin_fade_in(&mut self) {
        self.phase = FadePhase::FadingIn;
    }
}

// ── Property setters ──────────────────────────────────────────────────────────

/// Writes one named float parameter into the [`ScreenFade`] it sits on, once.
///
/// Known properties: `"speed"`.
#[derive(Component, Debug, Clone)]
pub struct FadeFloatSetter {
    pub property: String,
    pub value: f32,
}

/// Writes one named flag parameter into the [`ScreenFade`] it sits on, once.
///
/// Known properties: `"start_opaque"` — begin fully black and fade in, used on
/// level entry.
#[derive(Component, Debug, Clone)]
pub struct FadeFlagSetter {
    pub property: String,
    pub value: bool,
}

/// Spawn the fullscreen fade overlay.
///
/// The overlay starts opaque and fades in, so every level entry opens on
/// black; both parameters are authored through the setters rather than inline.
pub fn setup_fade_overlay(mut commands: Commands, config: Res<LanderConfig>) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..Default::default()
        },
        BackgroundColor(Color::BLACK.with_alpha(0.0)),
        GlobalZIndex(10),
        ScreenFade::default(),
        FadeFloatSetter {
            property: "speed".into(),
            value: config.fade_speed,
        },
        FadeFlagSetter {
            property: "start_opaque".into(),
            value: true,
        },
    ));
}

/// Apply newly-added setters to their [`ScreenFade`] and remove them.
///
/// Unknown property names are logged and dropped.
#[allow(clippy::type_complexity)]
pub fn apply_fade_setters_system(
    mut commands: Commands,
    mut q: Query<
        (
            Entity,
            &mut ScreenFade,
            Option<&FadeFloatSetter>,
            Option<&FadeFlagSetter>,
        ),
        Or<(Added<FadeFloatSetter>, Added<FadeFlagSetter>)>,
    >,
) {
    for (entity, mut fade, float_setter, flag_setter) in q.iter_mut() {
        if let Some(setter) = float_setter {
            match setter.property.as_str() {
                "speed" => fade.speed = setter.value,
                other => warn!("unknown fade float property {other:?}"),
            }
            commands.entity(entity).remove::<FadeFloatSetter>();
        }
        if let Some(setter) = flag_setter {
            match setter.property.as_str() {
                "start_opaque" => {
                    if setter.value {
                        fade.alpha = 1.0;
                        fade.phase = FadePhase::FadingIn;
                    }
                }
                other => warn!("unknown fade flag property {other:?}"),
            }
            commands.entity(entity).remove::<FadeFlagSetter>();
        }
    }
}

/// Ramp the overlay alpha and announce fade-out completion.
pub fn screen_fade_system(
    time: Res<Time>,
    mut q: Query<(&mut ScreenFade, &mut BackgroundColor)>,
    mut completed: MessageWriter<FadeOutCompleted>,
) {
    let dt = time.delta_secs();

    for (mut fade, mut background) in q.iter_mut() {
        match fade.phase {
            FadePhase::Idle => {}
            FadePhase::FadingOut => {
                fade.alpha = (fade.alpha + fade.speed * dt).min(1.0);
                if fade.alpha >= 1.0 {
                    fade.phase = FadePhase::Idle;
                    completed.write(FadeOutCompleted);
                }
            }
            FadePhase::FadingIn => {
                fade.alpha = (fade.alpha - fade.speed * dt).max(0.0);
                if fade.alpha <= 0.0 {
                    fade.phase = FadePhase::Idle;
                }
            }
        }
        *background = BackgroundColor(Color::BLACK.with_alpha(fade.alpha));
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn build_fade_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<FadeOutCompleted>();
        app.add_systems(Update, (apply_fade_setters_system, screen_fade_system).chain());
        // Warm the clock up: the very first update has a zero delta, and these
        // tests need a non-zero tick to ramp the fade.
        app.update();
        app
    }

    fn spawn_fade(app: &mut App, fade: ScreenFade) -> Entity {
        app.world_mut()
            .spawn((fade, BackgroundColor(Color::BLACK.with_alpha(fade.alpha))))
            .id()
    }

    fn completed_count(app: &App) -> usize {
        app.world().resource::<Messages<FadeOutCompleted>>().len()
    }

    #[test]
    fn fade_out_reaches_black_and_announces_once() {
        let mut app = build_fade_app();
        let overlay = spawn_fade(
            &mut app,
            ScreenFade {
                phase: FadePhase::FadingOut,
                alpha: 0.0,
                speed: 1.0e30, // crosses the full range in any non-zero tick
            },
        );

        app.update();
        let fade = *app.world().get::<ScreenFade>(overlay).unwrap();
        assert_eq!(fade.alpha, 1.0);
        assert_eq!(fade.phase, FadePhase::Idle);
        assert_eq!(completed_count(&app), 1);

        // Idle overlay stays put and does not re-announce.
        app.update();
        app.update();
        let fade = *app.world().get::<ScreenFade>(overlay).unwrap();
        assert_eq!(fade.phase, FadePhase::Idle);
        assert_eq!(completed_count(&app), 0, "messages drained, none new");
    }

    #[test]
    fn fade_in_clears_without_announcing() {
        let mut app = build_fade_app();
        let overlay = spawn_fade(
            &mut app,
            ScreenFade {
                phase: FadePhase::FadingIn,
                alpha: 1.0,
                speed: 1.0e30,
            },
        );

        app.update();
        let fade = *app.world().get::<ScreenFade>(overlay).unwrap();
        assert_eq!(fade.alpha, 0.0);
        assert_eq!(fade.phase, FadePhase::Idle);
        assert_eq!(completed_count(&app), 0);
    }

    #[test]
    fn float_setter_applies_once_and_removes_itself() {
        let mut app = build_fade_app();
        let overlay = app
            .world_mut()
            .spawn((
                ScreenFade::default(),
                BackgroundColor(Color::BLACK.with_alpha(0.0)),
                FadeFloatSetter {
                    property: "speed".into(),
                    value: 4.5,
                },
            ))
            .id();

        app.update();
        let world = app.world();
        assert_eq!(world.get::<ScreenFade>(overlay).unwrap().speed, 4.5);
        assert!(world.get::<FadeFloatSetter>(overlay).is_none());
    }

    #[test]
    fn start_opaque_flag_primes_a_fade_in() {
        let mut app = build_fade_app();
        let overlay = app
            .world_mut()
            .spawn((
                ScreenFade::default(),
                BackgroundColor(Color::BLACK.with_alpha(0.0)),
                FadeFlagSetter {
                    property: "start_opaque".into(),
                    value: true,
                },
            ))
            .id();

        app.update();
        let fade = *app.world().get::<ScreenFade>(overlay).unwrap();
        assert_eq!(fade.phase, FadePhase::FadingIn);
        assert!(app.world().get::<FadeFlagSetter>(overlay).is_none());
    }

    #[test]
    fn unknown_property_is_dropped_without_effect() {
        let mut app = build_fade_app();
        let overlay = app
            .world_mut()
            .spawn((
                ScreenFade::default(),
                BackgroundColor(Color::BLACK.with_alpha(0.0)),
                FadeFloatSetter {
                    property: "bogus".into(),
                    value: 99.0,
                },
            ))
            .id();

        app.update();
        let fade = *app.world().get::<ScreenFade>(overlay).unwrap();
        assert_eq!(fade.speed, crate::constants::FADE_SPEED);
        assert!(app.world().get::<FadeFloatSetter>(overlay).is_none());
    }
}
