//! Fixed-view perspective camera.
//!
//! The camera holds projection parameters and a fixed distance from the
//! origin; it never rotates or orbits. [`Camera::recalculate`] derives
//! the projection and view matrices, so callers that mutate a parameter
//! (in practice only `aspect`, set from canvas dimensions at scene
//! setup) must call it afterwards.

use glam::Mat4;
use std::f32::consts::FRAC_PI_4;

/// Perspective projection parameters plus a fixed view translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Distance of the camera from the origin along +Z.
    pub distance: f32,

    projection: Mat4,
    view: Mat4,
}

impl Camera {
    /// Creates a camera with the stock parameters (45 degree fov, near
    /// 0.1, far 100, distance 6) and the given aspect ratio. Matrices
    /// are derived immediately.
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov_y: FRAC_PI_4,
            aspect,
            near: 0.1,
            far: 100.0,
            distance: 6.0,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        };
        camera.recalculate();
        camera
    }

    /// Rederives the projection and view matrices from the current
    /// parameters. The view is a pure translation of `(0, 0, -distance)`.
    pub fn recalculate(&mut self) {
        self.projection = Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far);
        self.view = Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -self.distance));
    }

    /// The perspective projection matrix as of the last `recalculate`.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// The view matrix as of the last `recalculate`.
    pub fn view(&self) -> Mat4 {
        self.view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}
