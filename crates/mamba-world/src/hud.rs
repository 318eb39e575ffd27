use glam::Vec3;

use mamba_config::HudConfig;

const SMOOTHING: f32 = 0.1;
const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━";

const CONTROLS: [&str; 6] = [
    "━━━━━━ CONTROLS ━━━━━━",
    "WASD: Move | Arrows: Look",
    "Shift: Sprint",
    "ESC: Cursor",
    "H: Toggle HUD",
    "T: Toggle DAY/NIGHT",
];

/// Per-frame values the HUD reports on.
#[derive(Debug, Clone, Copy)]
pub struct HudContext<'a> {
    pub position: Vec3,
    /// Seconds since start.
    pub elapsed: f32,
    /// `None` when no day/night cycle is running.
    pub is_day: Option<bool>,
    pub module: Option<&'a str>,
}

/// Text for the two HUD panels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudLines {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl HudLines {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Overlay model: visibility plus a smoothed frame-time estimate.
pub struct Hud {
    config: HudConfig,
    visible: bool,
    smoothed_dt: f32,
}

impl Hud {
    pub fn new(config: HudConfig) -> Self {
        let visible = config.visible;
        Self {
            config,
            visible,
            smoothed_dt: 0.0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_key(&self) -> char {
        self.config.toggle_key
    }

    /// Feed one unscaled frame delta in seconds.
    pub fn update(&mut self, unscaled_dt: f32) {
        self.smoothed_dt += (unscaled_dt - self.smoothed_dt) * SMOOTHING;
    }

    pub fn fps(&self) -> f32 {
        if self.smoothed_dt > 0.0 {
            1.0 / self.smoothed_dt
        } else {
            0.0
        }
    }

    pub fn lines(&self, ctx: &HudContext<'_>) -> HudLines {
        if !self.visible {
            return HudLines::default();
        }

        let mut left = vec![self.config.title.clone(), RULE.to_string()];
        if self.config.show_fps {
            left.push(format!("FPS: {:.0}", self.fps()));
        }
        if self.config.show_position {
            let p = ctx.position;
            left.push(format!("POS: X:{:.1} Y:{:.1} Z:{:.1}", p.x, p.y, p.z));
        }
        if self.config.show_controls {
            left.push(String::new());
            left.extend(CONTROLS.iter().map(|s| s.to_string()));
        }

        let mut right = vec![
            "STATUS: ACTIVE".to_string(),
            format!("TIME: {:.1}s", ctx.elapsed),
        ];
        if let Some(day) = ctx.is_day {
            right.push(format!("CYCLE: {}", if day { "DAY" } else { "NIGHT" }));
        }
        right.push(format!("MODULE: {}", ctx.module.unwrap_or("none")));

        HudLines { left, right }
    }
}
