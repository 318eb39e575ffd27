//! Keyboard to camera input.
//!
//! Terminals report presses, not held keys, so a movement key keeps its axis
//! engaged for a short window that key repeat refreshes. Arrow keys produce
//! one look step per press.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use mamba_world::camera::CameraInput;

const HOLD: Duration = Duration::from_millis(180);

#[derive(Debug, Default)]
pub struct Controls {
    move_x: f32,
    move_z: f32,
    sprint: bool,
    held_until: Option<Instant>,
    look_x: f32,
    look_y: f32,
    unlock: bool,
    lock: bool,
}

impl Controls {
    /// Feed a key press. Returns `false` when the key is not a camera control.
    pub fn on_key(&mut self, key: &KeyEvent, now: Instant, look_step: f32, cursor_locked: bool) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let KeyCode::Char(c) = key.code else {
            return self.on_special(key.code, look_step, cursor_locked);
        };

        let (x, z) = match c.to_ascii_lowercase() {
            'w' => (0.0, 1.0),
            's' => (0.0, -1.0),
            'a' => (-1.0, 0.0),
            'd' => (1.0, 0.0),
            _ => return false,
        };
        // A new key replaces the previous direction unless it is on the other
        // axis, which lets alternating presses fly diagonally.
        if x != 0.0 {
            self.move_x = x;
        } else {
            self.move_z = z;
        }
        if self.held_until.is_none() {
            if x != 0.0 {
                self.move_z = 0.0;
            } else {
                self.move_x = 0.0;
            }
        }
        self.sprint = c.is_ascii_uppercase();
        self.held_until = Some(now + HOLD);
        true
    }

    fn on_special(&mut self, code: KeyCode, look_step: f32, cursor_locked: bool) -> bool {
        match code {
            KeyCode::Left => self.look_x -= look_step,
            KeyCode::Right => self.look_x += look_step,
            KeyCode::Up => self.look_y += look_step,
            KeyCode::Down => self.look_y -= look_step,
            KeyCode::Esc => {
                if cursor_locked {
                    self.unlock = true;
                } else {
                    self.lock = true;
                }
            }
            _ => return false,
        }
        true
    }

    /// Build this frame's camera input, consuming look and cursor requests.
    pub fn take_input(&mut self, now: Instant) -> CameraInput {
        if self.held_until.is_some_and(|until| now >= until) {
            self.held_until = None;
            self.move_x = 0.0;
            self.move_z = 0.0;
            self.sprint = false;
        }
        let input = CameraInput {
            look_x: self.look_x,
            look_y: self.look_y,
            move_x: self.move_x,
            move_z: self.move_z,
            sprint: self.sprint,
            unlock: self.unlock,
            lock: self.lock,
        };
        self.look_x = 0.0;
        self.look_y = 0.0;
        self.unlock = false;
        self.lock = false;
        input
    }
}
