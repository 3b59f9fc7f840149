//! Smoothed pointer state.
//!
//! The raw pointer target jumps around with every device event; the field
//! wants a value that trails it smoothly. `PointerState` keeps both: events
//! overwrite the target, and once per frame the smoothed value advances one
//! lerp step toward it.

use glam::Vec2;

/// A 2D pointer position smoothed frame-to-frame.
///
/// Coordinates are normalized device coordinates in [-1, 1] with +Y up,
/// but the smoothing itself is coordinate-agnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    target: Vec2,
    smoothed: Vec2,
}

impl PointerState {
    /// Create a pointer at rest in the center.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw target. Safe to call any number of times between
    /// frames; only the latest value matters.
    pub fn aim(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Advance the smoothed value one step toward the target:
    /// `smoothed += (target - smoothed) * factor`.
    ///
    /// Call at most once per frame, before any position queries that frame.
    /// A factor of 1.0 snaps to the target, 0.0 freezes in place.
    pub fn advance(&mut self, factor: f32) -> Vec2 {
        self.smoothed += (self.target - self.smoothed) * factor;
        self.smoothed
    }

    /// The current smoothed position.
    #[inline]
    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    /// The raw target last set by `aim`.
    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_lerp_step() {
        let mut p = PointerState::new();
        p.aim(Vec2::new(1.0, -1.0));
        let s = p.advance(0.05);
        assert!((s.x - 0.05).abs() < 1e-6);
        assert!((s.y + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_advance_converges_monotonically() {
        let target = Vec2::new(0.7, -0.3);
        let mut p = PointerState::new();
        p.aim(target);

        let mut last = p.smoothed().distance(target);
        for _ in 0..200 {
            p.advance(0.05);
            let d = p.smoothed().distance(target);
            assert!(d <= last);
            last = d;
        }
        assert!(last < 1e-3);
    }

    #[test]
    fn test_snap_and_freeze_factors() {
        let mut p = PointerState::new();
        p.aim(Vec2::splat(0.5));

        p.advance(0.0);
        assert_eq!(p.smoothed(), Vec2::ZERO);

        p.advance(1.0);
        assert_eq!(p.smoothed(), Vec2::splat(0.5));
    }

    #[test]
    fn test_retarget_mid_flight() {
        let mut p = PointerState::new();
        p.aim(Vec2::new(1.0, 0.0));
        p.advance(0.5);
        p.aim(Vec2::new(-1.0, 0.0));
        p.advance(0.5);
        // 0.5 -> halfway toward -1.0
        assert!((p.smoothed().x - (-0.25)).abs() < 1e-6);
    }
}
