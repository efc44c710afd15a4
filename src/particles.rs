//! Particle effects: engine exhaust and explosion debris.
//!
//! ## Design
//!
//! Particles are lightweight ECS entities with a [`Particle`] component that
//! stores physics state (velocity, age, colour).  A two-system pipeline handles
//! them:
//!
//! | System                        | Schedule | Purpose                                      |
//! |-------------------------------|----------|----------------------------------------------|
//! | `attach_particle_mesh_system` | Update   | Attach `Mesh2d` to freshly-spawned particles |
//! | `particle_update_system`      | Update   | Move, fade, and despawn expired particles    |
//!
//! Particle entities are spawned by free functions (`spawn_exhaust_particles`,
//! `spawn_explosion_particles`) that take only `&mut Commands` — no `Assets`
//! access needed at spawn time.  The `attach_particle_mesh_system` supplies the
//! `Mesh2d` one frame later, which is imperceptible at 60 Hz.
//!
//! A single shared circle-mesh [`ParticleMesh`] resource is created at plugin
//! startup to avoid per-particle mesh allocation.  Each particle receives its
//! own unique [`ColorMaterial`] so its alpha can be faded individually.

use crate::rocket::{ControlIntent, Rocket, RocketState};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;

// ── Resources ────────────────────────────────────────────────────────────────

/// Shared circle mesh used by all particle entities (created once at startup).
#[derive(Resource)]
pub struct ParticleMesh(pub Handle<Mesh>);

// ── Component ────────────────────────────────────────────────────────────────

/// Short-lived visual particle entity.
///
/// After spawning, `attach_particle_mesh_system` inserts the `Mesh2d` /
/// `MeshMaterial2d` pair and writes the material handle into `material`.
/// `particle_update_system` then moves, fades, and eventually despawns it.
#[derive(Component)]
pub struct Particle {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    /// Time alive so far (s).
    pub age: f32,
    /// Total lifetime (s); entity is despawned when `age >= lifetime`.
    pub lifetime: f32,
    /// Base colour red channel (sRGB, 0–1).
    pub r: f32,
    /// Base colour green channel.
    pub g: f32,
    /// Base colour blue channel.
    pub b: f32,
    /// Handle to this particle's unique `ColorMaterial` so `particle_update_system`
    /// can update the alpha.  `None` until `attach_particle_mesh_system` runs.
    pub material: Option<Handle<ColorMaterial>>,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_particle_mesh).add_systems(
            Update,
            (
                exhaust_emission_system,
                attach_particle_mesh_system,
                particle_update_system,
            )
                .chain(),
        );
    }
}

// ── Startup system ────────────────────────────────────────────────────────────

/// Create the shared circle mesh and store it as a [`ParticleMesh`] resource.
fn init_particle_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(2.0, 6));
    commands.insert_resource(ParticleMesh(handle));
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Emit exhaust below the nozzle while the rocket is alive and thrusting.
pub fn exhaust_emission_system(
    mut commands: Commands,
    intent: Res<ControlIntent>,
    q_rocket: Query<(&Transform, &RocketState), With<Rocket>>,
) {
    if intent.vertical <= 0.0 {
        return;
    }
    let Ok((transform, state)) = q_rocket.single() else {
        return;
    };
    if *state != RocketState::Alive {
        return;
    }

    let down = (transform.rotation * Vec3::NEG_Y).truncate();
    let nozzle = transform.translation.truncate() + down * 14.0;
    spawn_exhaust_particles(&mut commands, nozzle, down, intent.vertical);
}

/// Attach `Mesh2d` + `MeshMaterial2d` to every newly-spawned [`Particle`].
///
/// Uses [`Added<Particle>`] so it only runs for particles that appeared since
/// the last frame — zero overhead for the steady-state particle population.
pub fn attach_particle_mesh_system(
    mut commands: Commands,
    particle_mesh: Option<Res<ParticleMesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Particle), Added<Particle>>,
) {
    let Some(particle_mesh) = particle_mesh else {
        return;
    };
    for (entity, mut particle) in query.iter_mut() {
        let mat_handle = materials.add(ColorMaterial::from_color(Color::srgba(
            particle.r, particle.g, particle.b, 1.0,
        )));
        particle.material = Some(mat_handle.clone());
        commands
            .entity(entity)
            .insert((Mesh2d(particle_mesh.0.clone()), MeshMaterial2d(mat_handle)));
    }
}

/// Advance all particles: translate by velocity, fade alpha quadratically,
/// and despawn any whose age has exceeded their lifetime.
pub fn particle_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut particle) in query.iter_mut() {
        particle.age += dt;

        if particle.age >= particle.lifetime {
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;

        // Quadratic ease-out alpha: bright at birth, rapid fade at end.
        let t = particle.age / particle.lifetime; // 0 → 1
        let alpha = (1.0 - t).powi(2);

        if let Some(ref handle) = particle.material {
            if let Some(mat) = materials.get_mut(handle) {
                mat.color = Color::srgba(particle.r, particle.g, particle.b, alpha);
            }
        }
    }
}

// ── Public spawn helpers ──────────────────────────────────────────────────────

/// Spawn a short exhaust burst at the nozzle, fanned around `down`.
///
/// `throttle` (0–1) scales the plume speed so a feathered burn reads softer
/// than a full-throttle climb.
pub fn spawn_exhaust_particles(commands: &mut Commands, pos: Vec2, down: Vec2, throttle: f32) {
    let mut rng = rand::thread_rng();
    let count = 3_u32;

    let base = if down.length_squared() > 1e-6 {
        down.normalize()
    } else {
        Vec2::NEG_Y
    };
    let base_angle = base.y.atan2(base.x);

    for _ in 0..count {
        let angle = base_angle + rng.gen_range(-0.30_f32..0.30_f32);
        let speed = rng.gen_range(50.0_f32..120.0_f32) * throttle.clamp(0.2, 1.0);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;

        // Blue-white flame core with orange fringes.
        let r = rng.gen_range(0.80_f32..1.0_f32);
        let g = rng.gen_range(0.55_f32..0.85_f32);
        let b = rng.gen_range(0.30_f32..0.95_f32);

        let lifetime = rng.gen_range(0.12_f32..0.28_f32);
        let lateral = Vec2::new(-base.y, base.x) * rng.gen_range(-1.5_f32..1.5_f32);

        commands.spawn((
            Particle {
                velocity,
                age: 0.0,
                lifetime,
                r,
                g,
                b,
                material: None,
            },
            Transform::from_translation((pos + lateral).extend(0.9)),
            Visibility::default(),
        ));
    }
}

/// Spawn a debris ring at the fatal contact point when the rocket breaks up.
pub fn spawn_explosion_particles(commands: &mut Commands, pos: Vec2) {
    let mut rng = rand::thread_rng();
    let count = 18_u32;

    for _ in 0..count {
        let angle = rng.gen_range(0.0_f32..std::f32::consts::TAU);
        let speed = rng.gen_range(40.0_f32..180.0_f32);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;

        // Fire and scorched-hull greys.
        let (r, g, b) = if rng.gen_bool(0.6) {
            (
                rng.gen_range(0.90_f32..1.0_f32),
                rng.gen_range(0.35_f32..0.70_f32),
                rng.gen_range(0.0_f32..0.15_f32),
            )
        } else {
            let lum = rng.gen_range(0.35_f32..0.65_f32);
            (lum, lum, lum)
        };

        let lifetime = rng.gen_range(0.4_f32..1.1_f32);
        let offset = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));

        commands.spawn((
            Particle {
                velocity,
                age: 0.0,
                lifetime,
                r,
                g,
                b,
                material: None,
            },
            Transform::from_translation((pos + offset).extend(0.9)),
            Visibility::default(),
        ));
    }
}

/// Build a filled circle mesh approximated by an `n`-sided regular polygon.
///
/// Uses a triangle fan from the centre: `(0, i, i+1 mod n)`.
fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        positions.push([x, y, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        let v1 = i + 1;
        let v2 = (i + 1) % n as u32 + 1;
        indices.extend_from_slice(&[0, v1, v2]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
