//! Centralised flight and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::LanderConfig`] mirrors every constant and can override any
//! subset from `assets/lander.toml` without recompiling.

// ── Rocket: Flight ────────────────────────────────────────────────────────────

/// Upward thrust force (N) applied along the rocket's local up axis while the
/// vertical input is positive.
///
/// At `ROCKET_MASS` = 20 the weight is 3 000 N, so full thrust gives a
/// thrust-to-weight ratio of ~1.13 — enough to climb, not enough to be
/// careless with.
pub const LIFT_MULTIPLIER: f32 = 3400.0;

/// Explicit rocket mass (kg).  Pinning the mass instead of deriving it from
/// collider density keeps the thrust-to-weight feel stable if the hull
/// geometry is retuned.
pub const ROCKET_MASS: f32 = 20.0;

/// Manual roll rate (rad/s) applied around the body forward axis while the
/// horizontal input is non-zero.
pub const ROTATION_MULTIPLIER: f32 = 2.5;

/// Downward acceleration (u/s²) applied by the rocket controller every tick,
/// in every life-cycle state.  Negative = down.
///
/// Engine gravity is disabled at startup; this constant is the only source of
/// weight, which keeps the gravity force under the same per-tick control as
/// thrust.
pub const GRAVITY_ACCELERATION: f32 = -150.0;

/// Half-height (u) of the rocket hull capsule collider.
pub const ROCKET_HULL_HALF_HEIGHT: f32 = 10.0;

/// Radius (u) of the rocket hull capsule collider.
pub const ROCKET_HULL_RADIUS: f32 = 4.0;

/// Half-extent (u) of each landing-gear foot collider.
pub const GEAR_HALF_EXTENT: f32 = 1.5;

/// Lateral offset (u) from the hull centre line to each landing-gear foot.
pub const GEAR_SPREAD: f32 = 5.0;

/// Vertical offset (u) from the hull centre to the landing-gear feet.
/// Feet sit below the capsule so pad contact lands on gear first.
pub const GEAR_DROP: f32 = -13.0;

// ── Rocket: Outcome Sequencing ────────────────────────────────────────────────

/// Seconds between a clean touchdown and the level-advance check.
///
/// The check re-validates that the rocket is still waiting to finish; a death
/// inside this window silently invalidates the advance.
pub const FINISH_DELAY: f32 = 2.0;

/// Seconds between death and the level-reload check.
/// Long enough for the explosion debris and camera pull-back to read clearly.
pub const DEATH_DELAY: f32 = 2.5;

/// Base magnitude of the break-up impulse applied at the fatal contact point.
pub const EXPLOSION_BASE_FORCE: f32 = 600.0;

/// Impact speed (u/s) is multiplied by this before scaling the break-up
/// impulse, so fast crashes throw the hull harder than toppling over.
pub const EXPLOSION_VELOCITY_MULTIPLIER: f32 = 0.4;

/// Floor for the velocity scale factor.  A zero-speed tip-over still gets
/// `EXPLOSION_BASE_FORCE × MIN_EXPLOSION_MULTIPLIER` of impulse.
pub const MIN_EXPLOSION_MULTIPLIER: f32 = 1.0;

// ── Rocket: Thrust Audio ──────────────────────────────────────────────────────

/// Number of looping engine-audio emitters cycled round-robin.
///
/// Each thrust release fades out one emitter while the next press fades in the
/// following one, so overlapping ramps never cut each other off.
pub const THRUST_AUDIO_SLOTS: usize = 10;

/// Per-tick interpolation fraction for the engine-volume fades.
/// At 0.05 a full fade spans 20 ticks (~a third of a second at 60 Hz).
pub const VOLUME_FADE_RATE: f32 = 0.05;

/// Absolute volume error below which a fade is considered complete.
pub const VOLUME_FADE_EPSILON: f32 = 0.001;

/// Baseline linear volume of the engine loop; fade-ins target this value and
/// fade targets are clamped to `[0, ROCKET_BASE_VOLUME]`.
pub const ROCKET_BASE_VOLUME: f32 = 0.8;

// ── Chase Camera ──────────────────────────────────────────────────────────────

/// Fixed offset from the rocket to the camera, applied before velocity lead.
/// The Z component is the viewing depth the death pull-back scales from.
pub const CAMERA_OFFSET: [f32; 3] = [0.0, 40.0, 100.0];

/// Multiplied into the rocket's planar velocity before adding it to the camera
/// target.  Higher values make the camera lead further ahead of the rocket.
pub const CAMERA_VELOCITY_LEAD: [f32; 2] = [0.1, 0.2];

/// Lerp rate used while the rocket is flying free of any contact.
pub const FLIGHT_LERP_RATE: f32 = 0.7;

/// Lerp rate used while the rocket is touching something, so contact doesn't
/// whip the camera back onto the hull.
pub const COLLISION_LERP_RATE: f32 = 0.3;

/// Lerp rate used once the rocket is dead.  Very low: the camera drifts to a
/// stop and lets the debris tumble away from it.
pub const EXPLOSION_LERP_RATE: f32 = 0.03;

/// Interpolation factor for smoothing the applied lerp rate itself between
/// ticks.  Keeps rapid collision-state toggling from snapping the camera.
pub const LERP_RATE_SMOOTHING: f32 = 0.001;

/// Fraction of the depth offset added behind the camera when the rocket dies,
/// pulling the view back from the explosion.
pub const DEATH_DEPTH_PUSHBACK: f32 = 0.5;

// ── Level Transitions ─────────────────────────────────────────────────────────

/// Name of the level loaded when no level has been played yet.
pub const FIRST_LEVEL: &str = "gorge";

/// Screen-fade alpha change per second.  1.5 crosses the full range in ~0.7 s.
pub const FADE_SPEED: f32 = 1.5;

// ── Level Geometry ────────────────────────────────────────────────────────────

/// Half-extent (u) of the ground slab colliders.
pub const GROUND_HALF_WIDTH: f32 = 400.0;

/// Half-thickness (u) of the ground slab colliders.
pub const GROUND_HALF_HEIGHT: f32 = 10.0;

/// Half-extent (u) of launch and landing pad colliders.
pub const PAD_HALF_WIDTH: f32 = 20.0;

/// Half-thickness (u) of launch and landing pad colliders.
pub const PAD_HALF_HEIGHT: f32 = 4.0;

// ── Input ─────────────────────────────────────────────────────────────────────

/// Gamepad left-stick dead zone: axis values smaller than this are ignored.
pub const GAMEPAD_DEADZONE: f32 = 0.15;
