//! Camera rig and cloud drift.
//!
//! The camera never orbits: it sits on the Z axis looking down -Z and
//! responds only to the accumulated scroll offset, backing away and
//! sinking as the viewer scrolls. The slow rotation of the whole cloud is
//! a rigid-body model transform, so rest positions and link geometry stay
//! untouched.

use glam::{Mat4, Vec3};

/// Scroll-driven perspective camera.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Accumulated scroll offset in pixels.
    pub scroll: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at the top of the page.
    pub fn new() -> Self {
        Self {
            scroll: 0.0,
            fov_y: 75.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// World position: z = 50 at rest, receding and sinking with scroll.
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, -self.scroll * 0.02, 50.0 + self.scroll * 0.01)
    }

    /// View matrix looking down -Z from [`Camera::position`].
    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position(), -Vec3::Z, Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Rigid rotation of the whole cloud after `t` seconds: a steady yaw with
/// a slow pitch sway layered on top.
pub fn drift_rotation(t: f32) -> Mat4 {
    Mat4::from_rotation_x((t * 0.1).sin() * 0.1) * Mat4::from_rotation_y(t * 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_camera_rest_position() {
        let cam = Camera::new();
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn test_scroll_moves_camera_down_and_back() {
        let mut cam = Camera::new();
        cam.scroll = 1000.0;
        let pos = cam.position();
        assert!((pos.y - (-20.0)).abs() < 1e-4);
        assert!((pos.z - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_view_keeps_origin_ahead() {
        // The origin should land on the -Z axis in view space, 50 out.
        let cam = Camera::new();
        let origin = cam.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(origin.x.abs() < 1e-4 && origin.y.abs() < 1e-4);
        assert!((origin.z - (-50.0)).abs() < 1e-4);
    }

    #[test]
    fn test_drift_rotation_starts_at_identity() {
        let m = drift_rotation(0.0);
        let v = m * Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert!((v - Vec4::new(1.0, 2.0, 3.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_drift_rotation_preserves_length() {
        let v = Vec4::new(3.0, -4.0, 12.0, 0.0);
        for t in [0.5_f32, 2.0, 10.0, 100.0] {
            let r = drift_rotation(t) * v;
            assert!((r.length() - v.length()).abs() < 1e-4);
        }
    }
}
