//! Window input tracking for the backdrop.
//!
//! Translates raw winit events into the two values the simulation cares
//! about: the pointer position in normalized device coordinates (the raw
//! target that [`crate::PointerState`] smooths), and an accumulated scroll
//! offset that stands in for page scroll and drives the camera rig.

use glam::Vec2;
use winit::event::{MouseScrollDelta, WindowEvent};

/// Pixels per wheel line tick.
const LINE_SCROLL_PX: f32 = 40.0;

/// Pointer and scroll state derived from window events.
#[derive(Debug)]
pub struct Input {
    pointer_px: Vec2,
    pointer_ndc: Vec2,
    scroll: f32,
    window_size: (u32, u32),
}

impl Input {
    /// Create an input tracker for a window of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pointer_px: Vec2::ZERO,
            pointer_ndc: Vec2::ZERO,
            scroll: 0.0,
            window_size: (width.max(1), height.max(1)),
        }
    }

    /// Pointer position in physical pixels.
    #[inline]
    pub fn pointer_px(&self) -> Vec2 {
        self.pointer_px
    }

    /// Pointer position in normalized device coordinates, [-1, 1] with
    /// +X right and +Y up. This is the raw smoothing target, not the
    /// smoothed value.
    #[inline]
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    /// Accumulated scroll offset in pixels, never negative. Scrolling
    /// "down" (wheel toward the user) increases it, like page scroll.
    #[inline]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.window_size = (width, height);
        }
    }

    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let px = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * LINE_SCROLL_PX,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                self.on_scroll(px);
            }
            _ => {}
        }
    }

    fn on_cursor(&mut self, x: f32, y: f32) {
        self.pointer_px = Vec2::new(x, y);
        let (w, h) = self.window_size;
        self.pointer_ndc = Vec2::new(
            (x / w as f32) * 2.0 - 1.0,
            1.0 - (y / h as f32) * 2.0,
        );
    }

    fn on_scroll(&mut self, delta_px: f32) {
        // wheel up is positive in winit; page scroll runs the other way
        self.scroll = (self.scroll - delta_px).max(0.0);
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_ndc_mapping() {
        let mut input = Input::new(800, 600);

        input.on_cursor(400.0, 300.0);
        assert!(input.pointer_ndc().length() < 1e-6);

        input.on_cursor(800.0, 0.0);
        assert!((input.pointer_ndc() - Vec2::new(1.0, 1.0)).length() < 1e-6);

        input.on_cursor(0.0, 600.0);
        assert!((input.pointer_ndc() - Vec2::new(-1.0, -1.0)).length() < 1e-6);
        assert_eq!(input.pointer_px(), Vec2::new(0.0, 600.0));
    }

    #[test]
    fn test_resize_rescales_future_events() {
        let mut input = Input::new(800, 600);
        input.set_window_size(400, 300);
        input.on_cursor(400.0, 0.0);
        assert!((input.pointer_ndc() - Vec2::new(1.0, 1.0)).length() < 1e-6);

        // degenerate sizes are ignored rather than dividing by zero
        input.set_window_size(0, 0);
        input.on_cursor(200.0, 150.0);
        assert!(input.pointer_ndc().length() < 1e-6);
    }

    #[test]
    fn test_scroll_accumulates_and_floors_at_zero() {
        let mut input = Input::new(800, 600);

        input.on_scroll(-2.0 * LINE_SCROLL_PX);
        assert_eq!(input.scroll(), 80.0);
        input.on_scroll(-LINE_SCROLL_PX);
        assert_eq!(input.scroll(), 120.0);

        // scrolling back up past the top clamps
        input.on_scroll(4000.0);
        assert_eq!(input.scroll(), 0.0);
    }
}
