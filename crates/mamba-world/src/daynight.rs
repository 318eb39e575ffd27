use glam::Vec3;
use tracing::info;

use mamba_config::LightingConfig;

use crate::scene::Scene;
use crate::{lerp, rgb};

const SUN_PITCH_NIGHT: f32 = -80.0;
const SUN_PITCH_DAY: f32 = 50.0;
const SUN_YAW: f32 = -30.0;

/// Lighting values for one point of the day/night blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
    pub sun_pitch_deg: f32,
    pub sun_yaw_deg: f32,
    pub fog: Vec3,
    pub neon_intensity: f32,
}

/// Player-toggled day/night lighting with an eased transition.
///
/// `transition` is 1.0 at full day and 0.0 at full night. Each update moves it
/// a fraction of the remaining distance toward the target, so it approaches
/// but never overshoots.
pub struct DayNightCycle {
    config: LightingConfig,
    is_day: bool,
    transition: f32,
}

impl DayNightCycle {
    pub fn new(config: LightingConfig) -> Self {
        let is_day = !config.start_at_night;
        Self {
            config,
            is_day,
            transition: if is_day { 1.0 } else { 0.0 },
        }
    }

    pub fn toggle(&mut self) {
        self.is_day = !self.is_day;
        info!("switching to {}", if self.is_day { "DAY" } else { "NIGHT" });
    }

    pub fn set_time_of_day(&mut self, day: bool) {
        self.is_day = day;
    }

    pub fn is_day(&self) -> bool {
        self.is_day
    }

    pub fn transition(&self) -> f32 {
        self.transition
    }

    pub fn toggle_key(&self) -> char {
        self.config.toggle_key
    }

    /// Ease `transition` toward the current target.
    pub fn update(&mut self, dt: f32) {
        let target = if self.is_day { 1.0 } else { 0.0 };
        let t = (dt * self.config.transition_speed).clamp(0.0, 1.0);
        self.transition = lerp(self.transition, target, t);
    }

    /// Blend night → day presets by the current transition.
    pub fn lighting(&self) -> Lighting {
        let c = &self.config;
        let t = self.transition;
        Lighting {
            ambient: rgb(c.night_ambient).lerp(rgb(c.day_ambient), t),
            sun_color: rgb(c.night_light).lerp(rgb(c.day_light), t),
            sun_intensity: lerp(c.night_intensity, c.day_intensity, t),
            sun_pitch_deg: lerp(SUN_PITCH_NIGHT, SUN_PITCH_DAY, t),
            sun_yaw_deg: SUN_YAW,
            fog: rgb(c.night_fog).lerp(rgb(c.day_fog), t),
            neon_intensity: lerp(c.neon_intensity_night, c.neon_intensity_day, t),
        }
    }

    /// Write the current lighting into the scene, including every neon light.
    pub fn apply(&self, scene: &mut Scene) {
        let l = self.lighting();
        scene.atmosphere.ambient = l.ambient;
        scene.atmosphere.fog_color = l.fog;
        scene.sun.color = l.sun_color;
        scene.sun.intensity = l.sun_intensity;
        scene.sun.pitch_deg = l.sun_pitch_deg;
        scene.sun.yaw_deg = l.sun_yaw_deg;
        for light in scene.lights_mut() {
            light.intensity = l.neon_intensity;
        }
    }
}
