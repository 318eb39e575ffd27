//! Simulation side of the Mamba scene.
//!
//! Owns the in-memory scene graph and everything that writes to it once per
//! frame: the procedural environment generator (through [`host::SceneHost`],
//! the content host module activation goes through), the day/night lighting
//! cycle, the free-fly camera and the HUD model.

pub mod camera;
pub mod daynight;
pub mod environment;
pub mod host;
pub mod hud;
pub mod scene;

use glam::Vec3;

pub(crate) fn rgb(c: mamba_config::Rgb) -> Vec3 {
    Vec3::from_array(c)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
