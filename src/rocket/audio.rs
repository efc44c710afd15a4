//! Thrust-audio slot pool and non-blocking volume fades.
//!
//! The engine loop is never hard-cut.  A fixed pool of looping emitters is
//! cycled round-robin: releasing thrust starts a fade-out on the active
//! emitter and advances the index, so the next thrust press fades in a fresh
//! emitter while the old ramp is still finishing.  Each slot owns at most one
//! in-flight [`VolumeFade`], advanced once per tick — no two fades ever share
//! a slot, so they need no coordination.
//!
//! The pool itself is plain data ([`ThrustAudioBank`]); a sync system mirrors
//! it onto the real [`AudioSink`]s when they exist.  Headless tests drive the
//! bank directly and never touch an audio device.

use bevy::audio::{AudioSink, AudioSinkPlayback, Volume};
use bevy::math::FloatExt;
use bevy::prelude::*;

use crate::config::LanderConfig;
use crate::constants::{THRUST_AUDIO_SLOTS, VOLUME_FADE_EPSILON};

// ── Fade record ────────────────────────────────────────────────────────────────

/// One in-flight volume ramp, time-sliced across ticks.
///
/// `t` is the interpolation fraction, advanced by the fade rate each tick and
/// capped at 1, so every fade terminates in a bounded number of steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFade {
    pub from: f32,
    pub target: f32,
    pub t: f32,
    /// Stop the emitter once the volume settles on a silent target.
    pub stop_on_finish: bool,
}

// ── Slot ──────────────────────────────────────────────────────────────────────

/// One emitter in the pool: its current volume, play flag, optional fade, and
/// the audio entity it is mirrored onto (absent in headless tests).
#[derive(Debug, Default)]
pub struct AudioSlot {
    pub entity: Option<Entity>,
    pub playing: bool,
    pub volume: f32,
    pub fade: Option<VolumeFade>,
}

impl AudioSlot {
    /// Advance this slot's fade by one tick.
    ///
    /// Sets `volume = lerp(from, target, t)` then steps `t`; the fade is done
    /// when the volume is within [`VOLUME_FADE_EPSILON`] of the target or `t`
    /// has reached 1, whichever comes first.
    fn tick_fade(&mut self, rate: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        self.volume = fade.from.lerp(fade.target, fade.t);
        fade.t = (fade.t + rate).min(1.0);

        if (self.volume - fade.target).abs() <= VOLUME_FADE_EPSILON {
            self.volume = fade.target;
            if fade.stop_on_finish {
                self.playing = false;
            }
            self.fade = None;
        }
    }
}

// ── Bank ──────────────────────────────────────────────────────────────────────

/// Fixed pool of [`THRUST_AUDIO_SLOTS`] engine-loop emitters, cycled
/// round-robin.  Owned by the rocket controller; only its thrust and stop-all
/// paths mutate it.
#[derive(Resource, Debug)]
pub struct ThrustAudioBank {
    slots: Vec<AudioSlot>,
    active: usize,
    /// Fade-in target; fade targets are clamped to `[0, baseline]`.
    baseline: f32,
}

impl Default for ThrustAudioBank {
    fn default() -> Self {
        Self::new(crate::constants::ROCKET_BASE_VOLUME)
    }
}

impl ThrustAudioBank {
    pub fn new(baseline: f32) -> Self {
        Self {
            slots: (0..THRUST_AUDIO_SLOTS).map(|_| AudioSlot::default()).collect(),
            active: 0,
            baseline,
        }
    }

    #[inline]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn slots(&self) -> &[AudioSlot] {
        &self.slots
    }

    #[inline]
    pub fn slots_mut(&mut self) -> &mut [AudioSlot] {
        &mut self.slots
    }

    #[inline]
    pub fn active_slot(&self) -> &AudioSlot {
        &self.slots[self.active]
    }

    /// Thrust pressed: if the active emitter is idle, start it and fade it in
    /// toward the baseline volume.  Continuing thrust on an already-playing
    /// emitter does nothing — the running fade (or settled volume) stands.
    pub fn begin_thrust(&mut self) {
        let baseline = self.baseline;
        let slot = &mut self.slots[self.active];
        if slot.playing {
            return;
        }
        slot.playing = true;
        slot.fade = Some(fade_toward(slot.volume, baseline, baseline));
    }

    /// Thrust released: fade the active emitter out to silence (stopping it
    /// once silent) and advance the round-robin index.
    pub fn release_thrust(&mut self) {
        let baseline = self.baseline;
        let slot = &mut self.slots[self.active];
        if !slot.playing {
            return;
        }
        slot.fade = Some(VolumeFade {
            stop_on_finish: true,
            ..fade_toward(slot.volume, 0.0, baseline)
        });
        self.active = (self.active + 1) % self.slots.len();
    }

    /// Fade every playing emitter to silence concurrently, each stopping when
    /// its own ramp completes.  Used by the finish and death sequences.
    pub fn stop_all(&mut self) {
        let baseline = self.baseline;
        for slot in &mut self.slots {
            if slot.playing {
                slot.fade = Some(VolumeFade {
                    stop_on_finish: true,
                    ..fade_toward(slot.volume, 0.0, baseline)
                });
            }
        }
    }

    /// Advance every in-flight fade by one tick.
    pub fn tick(&mut self, rate: f32) {
        for slot in &mut self.slots {
            slot.tick_fade(rate);
        }
    }
}

/// Build a fade from `from` toward `target`, clamping the target into the
/// valid `[0, baseline]` volume range.
fn fade_toward(from: f32, target: f32, baseline: f32) -> VolumeFade {
    VolumeFade {
        from,
        target: target.clamp(0.0, baseline),
        t: 0.0,
        stop_on_finish: false,
    }
}

// ── Cues and engine-side plumbing ─────────────────────────────────────────────

/// Handles to the rocket's audio assets.
#[derive(Resource)]
pub struct RocketAudio {
    pub thrust_loop: Handle<AudioSource>,
    pub finish_cue: Handle<AudioSource>,
    pub death_cue: Handle<AudioSource>,
}

/// Fire-and-forget playback of a one-shot cue.
pub fn play_cue(commands: &mut Commands, cue: &Handle<AudioSource>) {
    commands.spawn((AudioPlayer::new(cue.clone()), PlaybackSettings::DESPAWN));
}

/// Startup: rebuild the bank at the configured baseline volume, load cue
/// assets, and spawn the pool's looping emitter entities, silent until the
/// sync system raises their volume.
pub fn setup_thrust_audio(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut bank: ResMut<ThrustAudioBank>,
    config: Res<LanderConfig>,
) {
    *bank = ThrustAudioBank::new(config.rocket_base_volume);
    let audio = RocketAudio {
        thrust_loop: asset_server.load("audio/engine_loop.ogg"),
        finish_cue: asset_server.load("audio/touchdown_chime.ogg"),
        death_cue: asset_server.load("audio/hull_breakup.ogg"),
    };

    for slot in bank.slots_mut() {
        let entity = commands
            .spawn((
                AudioPlayer::new(audio.thrust_loop.clone()),
                PlaybackSettings::LOOP.with_volume(Volume::Linear(0.0)),
            ))
            .id();
        slot.entity = Some(entity);
    }

    commands.insert_resource(audio);
}

/// Advance all fades once per frame.
pub fn thrust_audio_fade_system(mut bank: ResMut<ThrustAudioBank>, config: Res<LanderConfig>) {
    bank.tick(config.volume_fade_rate);
}

/// Mirror slot state onto the real audio sinks.
///
/// Sinks appear one frame after their `AudioPlayer` spawns, and never exist in
/// headless tests; both cases fall through harmlessly.
pub fn sync_thrust_audio_system(bank: Res<ThrustAudioBank>, mut sinks: Query<&mut AudioSink>) {
    for slot in bank.slots() {
        let Some(entity) = slot.entity else {
            continue;
        };
        let Ok(mut sink) = sinks.get_mut(entity) else {
            continue;
        };
        sink.set_volume(Volume::Linear(slot.volume));
        if slot.playing && sink.is_paused() {
            sink.play();
        } else if !slot.playing && !sink.is_paused() {
            sink.pause();
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
