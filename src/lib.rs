//! Perigee — an arcade rocket lander.
//!
//! Fly a thrust-and-tilt rocket off the launch pad and set it down on the
//! landing pad gear-first; anything else breaks the hull.  Bevy hosts the
//! engine loop and Rapier integrates the physics — this crate supplies the
//! flight model, life-cycle sequencing, audio crossfades, chase camera, and
//! level transitions.

pub mod animation;
pub mod camera;
pub mod config;
pub mod constants;
pub mod level;
pub mod particles;
pub mod rocket;
pub mod vec3ext;
