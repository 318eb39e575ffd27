use glam::{EulerRot, Quat, Vec3};

use mamba_config::CameraConfig;

const PITCH_LIMIT: f32 = 85.0;

/// One frame of camera input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// Horizontal look delta, positive turns right.
    pub look_x: f32,
    /// Vertical look delta, positive looks up.
    pub look_y: f32,
    /// Strafe axis in `-1.0..=1.0`.
    pub move_x: f32,
    /// Forward axis in `-1.0..=1.0`.
    pub move_z: f32,
    pub sprint: bool,
    /// Release the cursor (stop applying look input).
    pub unlock: bool,
    /// Capture the cursor again.
    pub lock: bool,
}

/// Free-fly camera with mouse-look and smoothed WASD movement.
pub struct FreeCam {
    config: CameraConfig,
    yaw: f32,
    pitch: f32,
    velocity: Vec3,
    position: Vec3,
    cursor_locked: bool,
}

impl FreeCam {
    pub fn new(config: CameraConfig) -> Self {
        let position = Vec3::from_array(config.start_position);
        Self {
            config,
            yaw: 0.0,
            pitch: 0.0,
            velocity: Vec3::ZERO,
            position,
            cursor_locked: true,
        }
    }

    pub fn look_step(&self) -> f32 {
        self.config.look_step
    }

    pub fn update(&mut self, input: &CameraInput, dt: f32) {
        if input.unlock {
            self.cursor_locked = false;
        }
        if input.lock {
            self.cursor_locked = true;
        }

        if self.cursor_locked {
            self.yaw += input.look_x * self.config.look_speed;
            self.pitch -= input.look_y * self.config.look_speed;
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        let dir = Vec3::new(input.move_x, 0.0, input.move_z).normalize_or_zero();
        let multiplier = if input.sprint {
            self.config.sprint_multiplier
        } else {
            1.0
        };
        let target = self.rotation() * dir * self.config.speed * multiplier;

        let t = (dt / self.config.smoothness).clamp(0.0, 1.0);
        self.velocity = self.velocity.lerp(target, t);
        self.position += self.velocity * dt;
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        )
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn cursor_locked(&self) -> bool {
        self.cursor_locked
    }
}
