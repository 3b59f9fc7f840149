//! Frame timing.
//!
//! One source of truth for elapsed time, delta time, and frame counting.
//! The backdrop pauses by freezing this clock: presentation keeps running,
//! elapsed time stands still, so the wave field holds its pose.

use std::time::{Duration, Instant};

/// Time tracking for the frame loop.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    /// Total time spent paused, excluded from `elapsed`.
    paused_total: Duration,
    paused_at: Option<Instant>,
    /// Fixed delta for deterministic stepping; `None` uses wall time.
    fixed_delta: Option<f32>,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
}

/// How often the FPS estimate refreshes.
const FPS_INTERVAL: Duration = Duration::from_millis(500);

impl Time {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused_total: Duration::ZERO,
            paused_at: None,
            fixed_delta: None,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
        }
    }

    /// Advance the clock one frame. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds. While paused, delta is zero
    /// and elapsed holds its value.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        if self.paused_at.is_some() {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, 0.0);
        }

        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = self.fixed_delta.unwrap_or(raw_delta);
        self.last_frame = now;

        self.elapsed_secs = (now.duration_since(self.start) - self.paused_total).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= FPS_INTERVAL {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Elapsed seconds since start, excluding paused time.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the two most recent frames.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames counted so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Recent frames-per-second estimate.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether the clock is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freeze elapsed time.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    /// Resume after a pause. The paused span never reaches `elapsed`.
    pub fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            let now = Instant::now();
            self.paused_total += now.duration_since(at);
            self.last_frame = now;
        }
    }

    /// Toggle between paused and running.
    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a fixed delta per frame instead of wall time. `None` reverts
    /// to real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_clock_at_rest() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_update_advances() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut time = Time::new();
        time.update();
        time.pause();
        assert!(time.is_paused());

        let frozen = time.elapsed();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert_eq!(elapsed, frozen);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_paused_span_excluded_after_resume() {
        let mut time = Time::new();
        time.update();
        let before = time.elapsed();

        time.pause();
        thread::sleep(Duration::from_millis(200));
        time.resume();
        thread::sleep(Duration::from_millis(5));
        let (elapsed, _) = time.update();

        // the 200ms paused span must not appear in elapsed time
        assert!(elapsed - before < 0.1);
    }

    #[test]
    fn test_fixed_delta_overrides_wall_time() {
        let mut time = Time::new();
        time.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(50));
        time.update();
        assert!((time.delta() - 1.0 / 60.0).abs() < 1e-4);
    }
}
