//! Per-frame camera state snapshot.

use crate::camera::PerspectiveCamera;
use crate::math::Matrix4;

/// Camera and viewport state for one frame.
///
/// Passed explicitly into the culling pipeline each frame instead of
/// being read from shared renderer state, so the same pipeline can be
/// driven by any number of cameras or by tests with synthetic matrices.
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// View matrix (world to view space).
    pub view: Matrix4,
    /// Projection matrix (view to clip space, 0-1 depth).
    pub projection: Matrix4,
    /// Inverse of the projection matrix.
    pub inverse_projection: Matrix4,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl FrameContext {
    /// Create a frame context from explicit matrices.
    pub fn new(
        view: Matrix4,
        projection: Matrix4,
        width: u32,
        height: u32,
        fov_y: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            view,
            projection,
            inverse_projection: projection.inverse(),
            width,
            height,
            fov_y,
            near,
            far,
        }
    }

    /// Snapshot a perspective camera for the given viewport.
    /// Updates the camera's aspect ratio to match the viewport.
    pub fn from_camera(camera: &mut PerspectiveCamera, width: u32, height: u32) -> Self {
        if height > 0 {
            camera.set_aspect(width as f32 / height as f32);
        }
        let view = *camera.view_matrix();
        let projection = *camera.projection_matrix();
        Self::new(view, projection, width, height, camera.fov, camera.near, camera.far)
    }

    /// Viewport aspect ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    #[test]
    fn test_from_camera_matches_viewport() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.set_position(Vector3::new(0.0, 0.0, 5.0));
        let frame = FrameContext::from_camera(&mut camera, 1280, 720);
        assert_eq!(frame.width, 1280);
        assert_eq!(frame.height, 720);
        assert!((frame.aspect_ratio() - 1280.0 / 720.0).abs() < 1e-6);
        assert!((frame.fov_y - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_projection_round_trip() {
        let proj = Matrix4::perspective(60.0_f32.to_radians(), 1.5, 0.1, 100.0);
        let frame = FrameContext::new(Matrix4::IDENTITY, proj, 1280, 720, 60.0, 0.1, 100.0);
        let p = Vector3::new(0.2, -0.1, -10.0);
        let ndc = frame.projection.transform_point(&p);
        let back = frame.inverse_projection.transform_point(&ndc);
        assert!(back.approx_eq(&p, 1e-3));
    }
}
