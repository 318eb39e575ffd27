use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::logging::LogEntry;

const SLIDE_DURATION: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slide {
    Closed,
    Opening { since: Instant },
    Open,
    Closing { since: Instant },
}

/// Drop-down console state: log scrollback, input line and slide animation.
pub struct Console {
    slide: Slide,
    log_lines: VecDeque<LogEntry>,
    pub input_buffer: String,
    pub cursor_pos: usize,
    scroll_offset: usize,
    max_lines: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Console {
    pub fn new(max_lines: usize) -> Self {
        Self {
            slide: Slide::Closed,
            log_lines: VecDeque::with_capacity(max_lines),
            input_buffer: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            max_lines,
        }
    }

    /// Start sliding open or closed. Toggling mid-slide reverses direction
    /// from the current position.
    pub fn toggle(&mut self, now: Instant) {
        let fraction = self.overlay_fraction(now);
        let elapsed = SLIDE_DURATION.mul_f64(1.0 - fraction);
        self.slide = match self.slide {
            Slide::Closed | Slide::Closing { .. } => Slide::Opening {
                since: now.checked_sub(SLIDE_DURATION.mul_f64(fraction)).unwrap_or(now),
            },
            Slide::Open | Slide::Opening { .. } => Slide::Closing {
                since: now.checked_sub(elapsed).unwrap_or(now),
            },
        };
    }

    /// Settle finished animations.
    pub fn update(&mut self, now: Instant) {
        self.slide = match self.slide {
            Slide::Opening { since } if now.saturating_duration_since(since) >= SLIDE_DURATION => {
                Slide::Open
            }
            Slide::Closing { since } if now.saturating_duration_since(since) >= SLIDE_DURATION => {
                Slide::Closed
            }
            other => other,
        };
    }

    /// How far the overlay is extended, from 0.0 (hidden) to 1.0 (open).
    pub fn overlay_fraction(&self, now: Instant) -> f64 {
        let progress = |since: Instant| {
            (now.saturating_duration_since(since).as_secs_f64() / SLIDE_DURATION.as_secs_f64())
                .clamp(0.0, 1.0)
        };
        match self.slide {
            Slide::Closed => 0.0,
            Slide::Open => 1.0,
            Slide::Opening { since } => progress(since),
            Slide::Closing { since } => 1.0 - progress(since),
        }
    }

    /// Anything on screen, including mid-animation.
    pub fn is_visible(&self) -> bool {
        self.slide != Slide::Closed
    }

    /// Fully open and capturing keys.
    pub fn is_open(&self) -> bool {
        self.slide == Slide::Open
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        if self.log_lines.len() >= self.max_lines {
            self.log_lines.pop_front();
            self.scroll_offset = self.scroll_offset.saturating_sub(1);
        }
        self.log_lines.push_back(entry);
    }

    pub fn log_lines(&self) -> &VecDeque<LogEntry> {
        &self.log_lines
    }

    pub fn clear_logs(&mut self) {
        self.log_lines.clear();
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, amount: usize) {
        let max_offset = self.log_lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + amount).min(max_offset);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn insert_char(&mut self, c: char) {
        self.input_buffer.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.input_buffer[..self.cursor_pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            let prev = self.prev_boundary();
            self.input_buffer.remove(prev);
            self.cursor_pos = prev;
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_pos = self.prev_boundary();
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.input_buffer[self.cursor_pos..].chars().next() {
            self.cursor_pos += c.len_utf8();
        }
    }

    /// Take the input line, leaving it empty.
    pub fn submit_input(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input_buffer)
    }
}
