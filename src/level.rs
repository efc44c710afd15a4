//! Level catalog, loading, and the fade-driven transition controller.
//!
//! Levels are static definitions spawned/despawned by name.  Transitions are
//! requested by message, begin with a screen fade-out, and complete when the
//! fade announces [`FadeOutCompleted`]:
//!
//! - **Advance** loads the configured next level.
//! - **Reload** remembers the *currently active* level as an override target
//!   and stores a one-shot-system callback that is run exactly once, before
//!   the load — the rocket uses it to restore its launch pose.

use crate::animation::ScreenFade;
use crate::constants::{
    GROUND_HALF_HEIGHT, GROUND_HALF_WIDTH, PAD_HALF_HEIGHT, PAD_HALF_WIDTH,
};
use crate::rocket::{ContactOverlap, LaunchPose, Rocket, RocketState, Surface};
use bevy::ecs::system::SystemId;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Catalog ───────────────────────────────────────────────────────────────────

/// A rectangular hazard inside a level.
pub struct Obstacle {
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Static definition of one playable level.
pub struct LevelDef {
    pub name: &'static str,
    /// Level loaded after a clean landing here.
    pub next: &'static str,
    /// Rocket launch pose (sitting on the launch pad).
    pub start: Vec2,
    pub launch_pad: Vec2,
    pub finish_pad: Vec2,
    pub ground_y: f32,
    pub obstacles: &'static [Obstacle],
}

/// Every playable level.  The last level's `next` wraps back to the first.
pub const LEVELS: &[LevelDef] = &[
    LevelDef {
        name: "gorge",
        next: "rim",
        start: Vec2::new(-250.0, -66.0),
        launch_pad: Vec2::new(-250.0, -86.0),
        finish_pad: Vec2::new(250.0, -86.0),
        ground_y: -100.0,
        obstacles: &[Obstacle {
            center: Vec2::new(0.0, -40.0),
            half_extents: Vec2::new(15.0, 50.0),
        }],
    },
    LevelDef {
        name: "rim",
        next: "gorge",
        start: Vec2::new(-280.0, -66.0),
        launch_pad: Vec2::new(-280.0, -86.0),
        finish_pad: Vec2::new(280.0, 14.0),
        ground_y: -100.0,
        obstacles: &[
            Obstacle {
                center: Vec2::new(-60.0, -30.0),
                half_extents: Vec2::new(12.0, 60.0),
            },
            Obstacle {
                center: Vec2::new(140.0, 40.0),
                half_extents: Vec2::new(80.0, 10.0),
            },
        ],
    },
];

/// Look a level up by name, falling back to the first entry.
pub fn find_level(name: &str) -> &'static LevelDef {
    LEVELS.iter().find(|def| def.name == name).unwrap_or_else(|| {
        warn!("unknown level {name:?}; falling back to {:?}", LEVELS[0].name);
        &LEVELS[0]
    })
}

// ── Resources and messages ────────────────────────────────────────────────────

/// Transition controller state.
#[derive(Resource, Default)]
pub struct LevelChanger {
    /// Name of the level a fade-out completes into, absent an override.
    pub next_level: String,
    /// Set by a reload request: load this level instead of `next_level`.
    pub level_override: Option<String>,
    /// One-shot system run exactly once when the fade-out completes.
    pub callback: Option<SystemId>,
}

/// Name of the level currently spawned.
#[derive(Resource, Default)]
pub struct CurrentLevel(pub String);

/// Ask the transition controller to change levels.
#[derive(Message, Debug, Clone, Copy)]
pub struct LevelChangeRequest {
    pub kind: LevelChangeKind,
}

#[derive(Debug, Clone, Copy)]
pub enum LevelChangeKind {
    /// Fade out, then load the configured next level.
    Advance,
    /// Fade out, then reload the active level, running `callback` first.
    Reload { callback: SystemId },
}

impl LevelChangeRequest {
    pub fn advance() -> Self {
        Self {
            kind: LevelChangeKind::Advance,
        }
    }

    pub fn reload(callback: SystemId) -> Self {
        Self {
            kind: LevelChangeKind::Reload { callback },
        }
    }
}

/// Announced by the fade system when a fade-out reaches black.
#[derive(Message, Debug, Clone, Copy)]
pub struct FadeOutCompleted;

/// Tags every entity belonging to the spawned level so a load can sweep it.
#[derive(Component)]
pub struct LevelEntity;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<LevelChangeRequest>()
            .add_message::<FadeOutCompleted>()
            .init_resource::<LevelChanger>()
            .init_resource::<CurrentLevel>()
            .add_systems(
                Startup,
                (
                    crate::animation::setup_fade_overlay
                        .after(crate::config::load_lander_config),
                    load_initial_level
                        .after(crate::config::load_lander_config)
                        .after(crate::rocket::spawn_rocket),
                ),
            )
            .add_systems(
                Update,
                (
                    crate::animation::apply_fade_setters_system,
                    level_change_request_system,
                    crate::animation::screen_fade_system,
                    fade_out_completed_system,
                )
                    .chain(),
            );
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn a level's geometry: ground slab, launch pad, finish pad, obstacles.
pub fn spawn_level(commands: &mut Commands, def: &LevelDef) {
    commands.spawn((
        LevelEntity,
        RigidBody::Fixed,
        Collider::cuboid(GROUND_HALF_WIDTH, GROUND_HALF_HEIGHT),
        Sprite::from_color(
            Color::srgb(0.25, 0.22, 0.20),
            Vec2::new(GROUND_HALF_WIDTH * 2.0, GROUND_HALF_HEIGHT * 2.0),
        ),
        Transform::from_translation(Vec2::new(0.0, def.ground_y).extend(0.0)),
    ));

    commands.spawn((
        LevelEntity,
        Surface::Friendly,
        RigidBody::Fixed,
        Collider::cuboid(PAD_HALF_WIDTH, PAD_HALF_HEIGHT),
        Sprite::from_color(
            Color::srgb(0.30, 0.35, 0.45),
            Vec2::new(PAD_HALF_WIDTH * 2.0, PAD_HALF_HEIGHT * 2.0),
        ),
        Transform::from_translation(def.launch_pad.extend(0.0)),
    ));

    commands.spawn((
        LevelEntity,
        Surface::FinishPad,
        RigidBody::Fixed,
        Collider::cuboid(PAD_HALF_WIDTH, PAD_HALF_HEIGHT),
        Sprite::from_color(
            Color::srgb(0.20, 0.55, 0.25),
            Vec2::new(PAD_HALF_WIDTH * 2.0, PAD_HALF_HEIGHT * 2.0),
        ),
        Transform::from_translation(def.finish_pad.extend(0.0)),
    ));

    for obstacle in def.obstacles {
        commands.spawn((
            LevelEntity,
            RigidBody::Fixed,
            Collider::cuboid(obstacle.half_extents.x, obstacle.half_extents.y),
            Sprite::from_color(
                Color::srgb(0.45, 0.30, 0.22),
                obstacle.half_extents * 2.0,
            ),
            Transform::from_translation(obstacle.center.extend(0.0)),
        ));
    }
}

/// Re-initialize the rocket for a freshly-loaded level: launch pose, stilled
/// body, restored constraints, `Alive` again.
#[allow(clippy::type_complexity)]
fn place_rocket(
    def: &LevelDef,
    q_rocket: &mut Query<
        (
            &mut RocketState,
            &mut LaunchPose,
            &mut Transform,
            &mut Velocity,
            &mut LockedAxes,
            &mut ExternalForce,
            &mut ExternalImpulse,
            &mut ContactOverlap,
        ),
        With<Rocket>,
    >,
) {
    let Ok((
        mut state,
        mut pose,
        mut transform,
        mut velocity,
        mut locked,
        mut force,
        mut impulse,
        mut overlap,
    )) = q_rocket.single_mut()
    else {
        return;
    };

    *state = RocketState::Alive;
    *pose = LaunchPose {
        translation: def.start,
        rotation: 0.0,
    };
    transform.translation = def.start.extend(transform.translation.z);
    transform.rotation = Quat::IDENTITY;
    *velocity = Velocity::zero();
    *locked = LockedAxes::empty();
    *force = ExternalForce::default();
    *impulse = ExternalImpulse::default();
    overlap.0 = 0;
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup: spawn the first level and aim the changer at its successor.
#[allow(clippy::type_complexity)]
pub fn load_initial_level(
    mut commands: Commands,
    config: Res<crate::config::LanderConfig>,
    mut changer: ResMut<LevelChanger>,
    mut current: ResMut<CurrentLevel>,
    mut q_rocket: Query<
        (
            &mut RocketState,
            &mut LaunchPose,
            &mut Transform,
            &mut Velocity,
            &mut LockedAxes,
            &mut ExternalForce,
            &mut ExternalImpulse,
            &mut ContactOverlap,
        ),
        With<Rocket>,
    >,
) {
    let def = find_level(&config.first_level);
    spawn_level(&mut commands, def);
    place_rocket(def, &mut q_rocket);
    current.0 = def.name.to_string();
    changer.next_level = def.next.to_string();
    info!("loaded level {:?}", def.name);
}

/// Handle transition requests: start the fade-out, and for reloads remember
/// the active level and the completion callback.
pub fn level_change_request_system(
    mut requests: MessageReader<LevelChangeRequest>,
    mut changer: ResMut<LevelChanger>,
    current: Res<CurrentLevel>,
    mut q_fade: Query<&mut ScreenFade>,
) {
    for request in requests.read() {
        if let Ok(mut fade) = q_fade.single_mut() {
            fade.begin_fade_out();
        }
        if let LevelChangeKind::Reload { callback } = request.kind {
            changer.level_override = Some(current.0.clone());
            changer.callback = Some(callback);
        }
    }
}

/// Complete a transition once the screen is black: run the stored callback,
/// then load the override level (reload) or the configured next level.
#[allow(clippy::type_complexity)]
pub fn fade_out_completed_system(
    mut completed: MessageReader<FadeOutCompleted>,
    mut commands: Commands,
    mut changer: ResMut<LevelChanger>,
    mut current: ResMut<CurrentLevel>,
    q_level: Query<Entity, With<LevelEntity>>,
    mut q_rocket: Query<
        (
            &mut RocketState,
            &mut LaunchPose,
            &mut Transform,
            &mut Velocity,
            &mut LockedAxes,
            &mut ExternalForce,
            &mut ExternalImpulse,
            &mut ContactOverlap,
        ),
        With<Rocket>,
    >,
    mut q_fade: Query<&mut ScreenFade>,
) {
    if completed.read().next().is_none() {
        return;
    }
    completed.clear();

    if let Some(callback) = changer.callback.take() {
        commands.run_system(callback);
    }

    let target = changer
        .level_override
        .take()
        .unwrap_or_else(|| changer.next_level.clone());
    let def = find_level(&target);

    for entity in q_level.iter() {
        commands.entity(entity).despawn();
    }
    spawn_level(&mut commands, def);
    place_rocket(def, &mut q_rocket);

    current.0 = def.name.to_string();
    changer.next_level = def.next.to_string();

    if let Ok(mut fade) = q_fade.single_mut() {
        fade.begin_fade_in();
    }
    info!("loaded level {:?}", def.name);
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct CallbackHits(u32);

    fn count_callback(mut hits: ResMut<CallbackHits>) {
        hits.0 += 1;
    }

    fn build_level_app() -> (App, SystemId) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<LevelChangeRequest>();
        app.add_message::<FadeOutCompleted>();
        app.init_resource::<CallbackHits>();
        app.insert_resource(LevelChanger {
            next_level: "rim".to_string(),
            level_override: None,
            callback: None,
        });
        app.insert_resource(CurrentLevel("gorge".to_string()));
        app.add_systems(
            Update,
            (level_change_request_system, fade_out_completed_system).chain(),
        );

        // Rocket with everything a level load touches.
        app.world_mut().spawn((
            Rocket,
            RocketState::Dead,
            LaunchPose {
                translation: Vec2::ZERO,
                rotation: 0.0,
            },
            ContactOverlap(3),
            Transform::from_xyz(77.0, -12.0, 0.0),
            Velocity::linear(Vec2::new(4.0, 4.0)),
            LockedAxes::ROTATION_LOCKED,
            ExternalForce::default(),
            ExternalImpulse::default(),
        ));
        app.world_mut().spawn((
            ScreenFade::default(),
            BackgroundColor(Color::BLACK.with_alpha(0.0)),
        ));

        let hook = app.world_mut().register_system(count_callback);
        (app, hook)
    }

    fn request(app: &mut App, request: LevelChangeRequest) {
        app.world_mut()
            .resource_mut::<Messages<LevelChangeRequest>>()
            .write(request);
        app.update();
    }

    fn finish_fade(app: &mut App) {
        app.world_mut()
            .resource_mut::<Messages<FadeOutCompleted>>()
            .write(FadeOutCompleted);
        app.update();
    }

    fn current_level(app: &App) -> String {
        app.world().resource::<CurrentLevel>().0.clone()
    }

    #[test]
    fn requests_trigger_the_fade_out() {
        let (mut app, hook) = build_level_app();
        request(&mut app, LevelChangeRequest::reload(hook));

        let world = app.world_mut();
        let fade = world.query::<&ScreenFade>().single(world).unwrap();
        assert_eq!(fade.phase, crate::animation::FadePhase::FadingOut);
        let changer = world.resource::<LevelChanger>();
        assert_eq!(changer.level_override.as_deref(), Some("gorge"));
        assert!(changer.callback.is_some());
    }

    #[test]
    fn reload_loads_the_previously_active_level_and_fires_callback_once() {
        let (mut app, hook) = build_level_app();
        request(&mut app, LevelChangeRequest::reload(hook));
        finish_fade(&mut app);

        // The active level is reloaded — not the configured next one.
        assert_eq!(current_level(&app), "gorge");
        assert_eq!(app.world().resource::<CallbackHits>().0, 1);
        assert!(app.world().resource::<LevelChanger>().callback.is_none());
        assert!(app
            .world()
            .resource::<LevelChanger>()
            .level_override
            .is_none());

        // A later plain fade-out (no reload) advances and must not re-fire.
        finish_fade(&mut app);
        assert_eq!(current_level(&app), "rim");
        assert_eq!(app.world().resource::<CallbackHits>().0, 1);
    }

    #[test]
    fn advance_loads_the_configured_next_level() {
        let (mut app, hook) = build_level_app();
        let _ = hook;
        request(&mut app, LevelChangeRequest::advance());
        finish_fade(&mut app);

        assert_eq!(current_level(&app), "rim");
        assert_eq!(app.world().resource::<CallbackHits>().0, 0);
        // The changer now aims at rim's successor.
        assert_eq!(app.world().resource::<LevelChanger>().next_level, "gorge");
    }

    #[test]
    fn load_reinitializes_the_rocket() {
        let (mut app, hook) = build_level_app();
        request(&mut app, LevelChangeRequest::reload(hook));
        finish_fade(&mut app);

        let world = app.world_mut();
        let (state, pose, transform, velocity, locked, overlap) = world
            .query::<(
                &RocketState,
                &LaunchPose,
                &Transform,
                &Velocity,
                &LockedAxes,
                &ContactOverlap,
            )>()
            .single(world)
            .unwrap();

        let def = find_level("gorge");
        assert_eq!(*state, RocketState::Alive);
        assert_eq!(pose.translation, def.start);
        assert_eq!(transform.translation.truncate(), def.start);
        assert_eq!(velocity.linvel, Vec2::ZERO);
        assert!(locked.is_empty());
        assert_eq!(overlap.0, 0);
    }

    #[test]
    fn fade_in_begins_after_the_load() {
        let (mut app, hook) = build_level_app();
        request(&mut app, LevelChangeRequest::reload(hook));
        finish_fade(&mut app);

        let world = app.world_mut();
        let fade = world.query::<&ScreenFade>().single(world).unwrap();
        assert_eq!(fade.phase, crate::animation::FadePhase::FadingIn);
    }

    #[test]
    fn level_catalog_names_and_links_resolve() {
        for def in LEVELS {
            assert_eq!(find_level(def.name).name, def.name);
            // Every next pointer lands on a real level.
            assert!(LEVELS.iter().any(|other| other.name == def.next));
        }
        assert_eq!(find_level("nonsense").name, LEVELS[0].name);
    }
}
