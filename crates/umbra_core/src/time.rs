//! Frame timing utilities.
//!
//! `Time` is produced once per frame by the application runner and handed to
//! the renderer's `update`.  The runner owns the `TimeClock` that produces
//! snapshots.

/// Longest frame step handed to animation.  A window drag or a debugger
/// break would otherwise spin every instance by a huge angle at once.
pub const MAX_DELTA: f32 = 0.1;

/// A snapshot of timing information for the current frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Seconds elapsed since the previous frame, clamped to [`MAX_DELTA`].
    pub delta: f32,

    /// Total seconds elapsed since the application started.
    pub elapsed: f64,

    /// Number of frames produced so far (0 for the first frame).
    pub frame_count: u64,

    /// Instantaneous frames-per-second derived from `delta`.
    pub fps: f32,
}

/// Stateful timer that accumulates time and produces [`Time`] snapshots.
pub struct TimeClock {
    start:       std::time::Instant,
    last_tick:   std::time::Instant,
    frame_count: u64,
}

impl TimeClock {
    /// Create a new clock, starting the epoch now.
    pub fn new() -> Self {
        let now = std::time::Instant::now();
        Self {
            start:       now,
            last_tick:   now,
            frame_count: 0,
        }
    }

    fn snapshot(&self, now: std::time::Instant) -> Time {
        let raw_dt  = (now - self.last_tick).as_secs_f32();
        let delta   = raw_dt.min(MAX_DELTA);
        let elapsed = (now - self.start).as_secs_f64();
        let fps     = if delta > 0.0 { 1.0 / delta } else { 0.0 };
        Time { delta, elapsed, frame_count: self.frame_count, fps }
    }

    /// Return the current [`Time`] without advancing the clock.
    pub fn peek(&self) -> Time {
        self.snapshot(std::time::Instant::now())
    }

    /// Advance by one frame.  Returns the [`Time`] snapshot for this frame.
    pub fn tick(&mut self) -> Time {
        let now  = std::time::Instant::now();
        let time = self.snapshot(now);
        self.last_tick   = now;
        self.frame_count += 1;
        time
    }
}

impl Default for TimeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_frames_and_clamps_delta() {
        let mut clock = TimeClock::new();
        let first = clock.tick();
        assert_eq!(first.frame_count, 0);
        assert!(first.delta <= MAX_DELTA);
        let second = clock.tick();
        assert_eq!(second.frame_count, 1);
        assert!(second.elapsed >= first.elapsed);
    }

    #[test]
    fn peek_does_not_advance() {
        let clock = TimeClock::new();
        assert_eq!(clock.peek().frame_count, 0);
        assert_eq!(clock.peek().frame_count, 0);
    }
}
