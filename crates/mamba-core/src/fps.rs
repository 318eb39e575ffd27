use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Time since the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameDelta {
    /// Capped delta the simulation steps consume.
    pub dt: Duration,
    /// Actual elapsed wall time, uncapped.
    pub raw: Duration,
}

/// Frame timing for the main loop.
///
/// [`frame`](FrameClock::frame) is called once per loop iteration. It returns
/// the delta since the previous frame and keeps a sliding window of
/// timestamps for a frames-per-second readout.
pub struct FrameClock {
    timestamps: VecDeque<Instant>,
    window: Duration,
    last: Option<Instant>,
    max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FrameClock {
    pub fn new(window: Duration) -> Self {
        Self {
            timestamps: VecDeque::new(),
            window,
            last: None,
            max_delta: Duration::from_millis(250),
        }
    }

    /// Record a frame at `now` and return the elapsed time since the last one.
    ///
    /// The first frame yields zero. `dt` is capped so a stalled terminal
    /// (e.g. a suspended process) doesn't teleport the camera on resume.
    pub fn frame(&mut self, now: Instant) -> FrameDelta {
        let raw = self
            .last
            .and_then(|last| now.checked_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);

        self.timestamps.push_back(now);
        let cutoff = now.checked_sub(self.window);
        while let (Some(&front), Some(cutoff)) = (self.timestamps.front(), cutoff) {
            if front >= cutoff {
                break;
            }
            self.timestamps.pop_front();
        }
        FrameDelta {
            dt: raw.min(self.max_delta),
            raw,
        }
    }

    /// Frames recorded within the window, scaled to one second.
    pub fn fps(&self) -> f64 {
        if self.timestamps.len() < 2 {
            return 0.0;
        }
        self.timestamps.len() as f64 / self.window.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_delta() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.frame(Instant::now()), FrameDelta::default());
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn delta_between_frames() {
        let mut clock = FrameClock::default();
        let base = Instant::now();
        clock.frame(base);
        let delta = clock.frame(base + Duration::from_millis(16));
        assert_eq!(delta.dt, Duration::from_millis(16));
        assert_eq!(delta.raw, Duration::from_millis(16));
    }

    #[test]
    fn delta_is_capped_but_raw_is_not() {
        let mut clock = FrameClock::default();
        let base = Instant::now();
        clock.frame(base);
        let delta = clock.frame(base + Duration::from_secs(5));
        assert_eq!(delta.dt, Duration::from_millis(250));
        assert_eq!(delta.raw, Duration::from_secs(5));
    }

    #[test]
    fn fps_counts_frames_in_window() {
        let mut clock = FrameClock::new(Duration::from_secs(1));
        let base = Instant::now();
        for i in 0..10 {
            clock.frame(base + Duration::from_millis(i * 100));
        }
        let fps = clock.fps();
        assert!(fps > 9.0 && fps < 11.0, "fps was {}", fps);
    }

    #[test]
    fn old_frames_pruned() {
        let mut clock = FrameClock::new(Duration::from_secs(1));
        let base = Instant::now();
        for i in 0..5 {
            clock.frame(base + Duration::from_millis(i * 200));
        }
        for i in 0..3 {
            clock.frame(base + Duration::from_millis(2000 + i * 300));
        }
        assert_eq!(clock.timestamps.len(), 3);
    }
}
