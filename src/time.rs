//! Frame timing for the animation loop.
//!
//! [`FrameClock`] turns frame timestamps into a simulation step measured in
//! 60 Hz frames, so particle velocities stay in "pixels per frame" whatever
//! the display refresh rate. Steps are clamped: a long gap (window hidden,
//! debugger pause) produces at most `max_step` frames of motion, and a
//! zero-length gap produces none.
//!
//! Timestamps are passed in rather than read from the system clock so the
//! loop can be driven by a window's redraw events, a headless renderer, or a
//! test with synthetic instants.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use plexus::time::FrameClock;
//!
//! let start = Instant::now();
//! let mut clock = FrameClock::new(3.0, None);
//!
//! assert_eq!(clock.tick(start), 1.0);
//! let step = clock.tick(start + Duration::from_secs(5));
//! assert_eq!(step, 3.0); // clamped
//! ```

use std::time::{Duration, Instant};

/// Reference frame rate that velocities are expressed in.
pub const REFERENCE_FPS: f32 = 60.0;

/// Timestamps may arrive this much early and still satisfy a frame-rate cap.
const FRAME_JITTER: Duration = Duration::from_millis(1);

/// Step and frame bookkeeping for one animation loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// When the last tick happened. `None` before the first tick and after
    /// a pause, so the next tick takes a nominal single-frame step.
    last_frame: Option<Instant>,
    /// Simulated time in seconds, excluding pauses.
    elapsed_secs: f32,
    /// Last step in 60 Hz frames.
    step: f32,
    frame_count: u64,
    paused: bool,
    max_step: f32,
    min_interval: Option<Duration>,
}

impl FrameClock {
    /// Create a clock. `max_fps` of `None` ticks on every frame offered.
    pub fn new(max_step: f32, max_fps: Option<f32>) -> Self {
        let mut clock = Self {
            last_frame: None,
            elapsed_secs: 0.0,
            step: 0.0,
            frame_count: 0,
            paused: false,
            max_step: max_step.max(0.0),
            min_interval: None,
        };
        clock.set_max_fps(max_fps);
        clock
    }

    /// Whether a frame at `now` should run under the frame-rate cap.
    pub fn ready(&self, now: Instant) -> bool {
        match (self.min_interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) + FRAME_JITTER >= interval,
            _ => true,
        }
    }

    /// Record a frame at `now` and return the clamped step in 60 Hz frames.
    ///
    /// Returns 0 while paused.
    pub fn tick(&mut self, now: Instant) -> f32 {
        if self.paused {
            self.step = 0.0;
            return 0.0;
        }

        let step = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32() * REFERENCE_FPS,
            None => 1.0,
        };
        self.step = step.clamp(0.0, self.max_step);
        self.last_frame = Some(now);
        self.elapsed_secs += self.step / REFERENCE_FPS;
        self.frame_count += 1;
        self.step
    }

    /// Stop advancing. Ticks return 0 until [`FrameClock::resume`].
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The time spent paused is never simulated.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_frame = None;
        }
    }

    /// Cap the tick rate, or remove the cap with `None`.
    pub fn set_max_fps(&mut self, max_fps: Option<f32>) {
        self.min_interval = max_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
    }

    /// Earliest instant the next capped frame may run, if capped.
    pub fn next_frame_at(&self) -> Option<Instant> {
        Some(self.last_frame? + self.min_interval?.saturating_sub(FRAME_JITTER))
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Simulated seconds since start, excluding pauses.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(3.0, None)
    }
}

/// Average frame rate over a fixed reporting window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    frames: u32,
    window_start: Option<Instant>,
    fps: f32,
}

impl FpsCounter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            frames: 0,
            window_start: None,
            fps: 0.0,
        }
    }

    /// Count a frame. Returns the new average once per elapsed window.
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let window = now.saturating_duration_since(start);
        if window < self.interval || window.is_zero() {
            return None;
        }
        self.fps = self.frames as f32 / window.as_secs_f32();
        self.frames = 0;
        self.window_start = Some(now);
        Some(self.fps)
    }

    /// Drop the current window, e.g. after a pause.
    pub fn reset(&mut self) {
        self.frames = 0;
        self.window_start = None;
    }

    /// Last reported average.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_tick_is_one_frame() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(Instant::now()), 1.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_step_scales_with_elapsed_time() {
        let t0 = Instant::now();
        let mut clock = FrameClock::default();
        clock.tick(t0);
        let step = clock.tick(t0 + ms(32));
        assert!((step - 1.92).abs() < 1e-3);
    }

    #[test]
    fn test_step_is_clamped() {
        let t0 = Instant::now() + ms(100);
        let mut clock = FrameClock::new(3.0, None);
        clock.tick(t0);
        assert_eq!(clock.tick(t0 + Duration::from_secs(10)), 3.0);
        // A timestamp from the past counts as no time at all
        assert_eq!(clock.tick(t0), 0.0);
    }

    #[test]
    fn test_pause_does_not_simulate_gap() {
        let t0 = Instant::now();
        let mut clock = FrameClock::default();
        clock.tick(t0);
        clock.pause();
        assert!(clock.is_paused());
        assert_eq!(clock.tick(t0 + ms(500)), 0.0);

        clock.resume();
        assert_eq!(clock.tick(t0 + Duration::from_secs(60)), 1.0);
        assert!((clock.elapsed() - 2.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_fps_cap() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(3.0, Some(30.0));
        assert!(clock.ready(t0));
        clock.tick(t0);
        assert!(!clock.ready(t0 + ms(17)));
        assert!(clock.ready(t0 + ms(33)));
        assert_eq!(clock.next_frame_at(), Some(t0 + Duration::from_secs_f32(1.0 / 30.0) - ms(1)));

        clock.set_max_fps(None);
        assert!(clock.ready(t0 + ms(1)));
        assert_eq!(clock.next_frame_at(), None);
    }

    #[test]
    fn test_fps_counter_reports_per_window() {
        let t0 = Instant::now();
        let mut counter = FpsCounter::new(ms(1000));
        for i in 0..60 {
            assert_eq!(counter.record(t0 + ms(i * 16)), None);
        }
        let fps = counter.record(t0 + ms(1000)).unwrap();
        assert!((fps - 61.0).abs() < 1e-3);
        assert_eq!(counter.fps(), fps);
    }
}
