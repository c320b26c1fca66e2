//! Frame timing.

use std::time::{Duration, Instant};

/// Measures wall time per frame and accumulates simple statistics.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    frames: u64,
    slowest: Duration,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frames: 0,
            slowest: Duration::ZERO,
        }
    }

    /// Total time since the timer was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Mark the end of a frame and return its duration.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        self.frames += 1;
        self.slowest = self.slowest.max(delta);
        delta
    }

    /// Number of frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Longest single frame observed.
    pub fn slowest_frame(&self) -> Duration {
        self.slowest
    }

    /// Average frame duration, zero before the first tick.
    pub fn average_frame(&self) -> Duration {
        match u32::try_from(self.frames) {
            Ok(0) => Duration::ZERO,
            Ok(frames) => (self.last_tick - self.start) / frames,
            Err(_) => Duration::from_secs_f64(
                (self.last_tick - self.start).as_secs_f64() / self.frames as f64,
            ),
        }
    }

    /// Reset the timer and its statistics.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
