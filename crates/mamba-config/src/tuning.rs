use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Linear RGB triple in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// Day/night lighting presets and transition tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightingConfig {
    pub day_ambient: Rgb,
    pub day_light: Rgb,
    pub day_intensity: f32,
    pub day_fog: Rgb,
    pub night_ambient: Rgb,
    pub night_light: Rgb,
    pub night_intensity: f32,
    pub night_fog: Rgb,
    pub neon_intensity_day: f32,
    pub neon_intensity_night: f32,
    /// Fraction of the remaining distance covered per second.
    pub transition_speed: f32,
    pub toggle_key: char,
    pub start_at_night: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            day_ambient: [0.4, 0.4, 0.5],
            day_light: [1.0, 0.95, 0.8],
            day_intensity: 1.0,
            day_fog: [0.5, 0.6, 0.7],
            night_ambient: [0.05, 0.05, 0.1],
            night_light: [0.3, 0.4, 0.6],
            night_intensity: 0.2,
            night_fog: [0.05, 0.1, 0.15],
            neon_intensity_day: 0.5,
            neon_intensity_night: 2.5,
            transition_speed: 1.0,
            toggle_key: 't',
            start_at_night: false,
        }
    }
}

/// Free-fly camera tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub speed: f32,
    /// Degrees of rotation per unit of look input.
    pub look_speed: f32,
    pub sprint_multiplier: f32,
    /// Seconds for the velocity to catch up with the input direction.
    pub smoothness: f32,
    /// Look input produced by one arrow-key press.
    pub look_step: f32,
    pub start_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            look_speed: 2.0,
            sprint_multiplier: 3.0,
            smoothness: 0.1,
            look_step: 5.0,
            start_position: [0.0, 2.0, 0.0],
        }
    }
}

/// On-screen HUD options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HudConfig {
    pub visible: bool,
    pub title: String,
    pub show_fps: bool,
    pub show_position: bool,
    pub show_controls: bool,
    pub toggle_key: char,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            visible: true,
            title: "VUELO - MULTIVERSO MAMBA".to_string(),
            show_fps: true,
            show_position: true,
            show_controls: true,
            toggle_key: 'h',
        }
    }
}

pub(crate) fn validate_positive(field: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        bail!("{field} must be a positive number, got {value}");
    }
    Ok(())
}

pub(crate) fn validate_color(field: &str, rgb: &Rgb) -> Result<()> {
    if rgb.iter().any(|c| !(0.0..=1.0).contains(c)) {
        bail!("{field} components must be within 0.0..=1.0, got {rgb:?}");
    }
    Ok(())
}

impl LightingConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, rgb) in [
            ("lighting.day_ambient", &self.day_ambient),
            ("lighting.day_light", &self.day_light),
            ("lighting.day_fog", &self.day_fog),
            ("lighting.night_ambient", &self.night_ambient),
            ("lighting.night_light", &self.night_light),
            ("lighting.night_fog", &self.night_fog),
        ] {
            validate_color(field, rgb)?;
        }
        validate_positive("lighting.transition_speed", self.transition_speed)?;
        if self.day_intensity < 0.0 || self.night_intensity < 0.0 {
            bail!("lighting intensities must not be negative");
        }
        Ok(())
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        validate_positive("camera.speed", self.speed)?;
        validate_positive("camera.look_speed", self.look_speed)?;
        validate_positive("camera.sprint_multiplier", self.sprint_multiplier)?;
        validate_positive("camera.smoothness", self.smoothness)?;
        validate_positive("camera.look_step", self.look_step)?;
        Ok(())
    }
}
