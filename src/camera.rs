/*

    Declare the camera view consumed by the box pipeline: view and
    projection matrices plus a frustum visibility test. The renderer
    owns the real camera; this is the per-frame snapshot of it.

    Right handed convention, camera looks down -z in view space, so a
    point behind the camera has positive view-space z.

    @date: Oct, 2025
    @author: bartu
*/

use crate::geometry::Aabb;
use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct Camera {
    view: Matrix4,
    projection: Matrix4,
    near: Float,
    far: Float,
}

impl Camera {
    pub fn new(view: Matrix4, projection: Matrix4, near: Float, far: Float) -> Self {
        Self {
            view,
            projection,
            near,
            far,
        }
    }

    /// Standard perspective camera from a pose. fovy is in degrees, as
    /// camera descriptions usually carry it.
    pub fn perspective(
        position: Vector3,
        look_at: Vector3,
        up: Vector3,
        fovy_degrees: Float,
        aspect: Float,
        near: Float,
        far: Float,
    ) -> Self {
        let view = Matrix4::look_at_rh(position, look_at, up);
        let projection = Matrix4::perspective_rh_gl(fovy_degrees.to_radians(), aspect, near, far);
        Self::new(view, projection, near, far)
    }

    pub fn view_matrix(&self) -> &Matrix4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection
    }

    pub fn near_clip(&self) -> Float {
        self.near
    }

    pub fn far_clip(&self) -> Float {
        self.far
    }

    /// World-to-camera rotation, extracted from the view matrix. The
    /// view matrix must not carry scale (ours never do).
    pub fn view_rotation(&self) -> Quaternion {
        Quaternion::from_mat4(&self.view)
    }

    /// Frustum visibility test for a world-space box. Conservative:
    /// true when the box is fully or partially inside the frustum.
    ///
    /// Planes are extracted from projection * view row combinations
    /// (Gribb/Hartmann), then each plane is tested against the box
    /// corner furthest along the plane normal.
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        let m = self.projection * self.view;
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);

        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ];

        for plane in planes {
            // Positive vertex: the corner of the box furthest along
            // the plane normal. If even that corner is behind the
            // plane, the whole box is outside.
            let positive = Vector3::new(
                if plane.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if plane.x * positive.x + plane.y * positive.y + plane.z * positive.z + plane.w < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        // At the origin, looking down -z
        Camera::perspective(
            Vector3::ZERO,
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::Y,
            60.0,
            1.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn test_identity_pose_view_rotation() {
        let cam = test_camera();
        let rot = cam.view_rotation();
        assert!(rot.angle_between(Quaternion::IDENTITY) < 1e-9);
    }

    #[test]
    fn test_frustum_visibility() {
        let cam = test_camera();

        // In front of the camera
        let front = Aabb::new(Vector3::new(-1.0, -1.0, -6.0), Vector3::new(1.0, 1.0, -4.0));
        assert!(cam.is_visible(&front));

        // Behind the camera
        let behind = Aabb::new(Vector3::new(-1.0, -1.0, 4.0), Vector3::new(1.0, 1.0, 6.0));
        assert!(!cam.is_visible(&behind));

        // Beyond the far plane
        let too_far = Aabb::new(
            Vector3::new(-1.0, -1.0, -300.0),
            Vector3::new(1.0, 1.0, -200.0),
        );
        assert!(!cam.is_visible(&too_far));

        // Straddling the right frustum plane: still visible
        let straddling = Aabb::new(Vector3::new(2.0, -1.0, -6.0), Vector3::new(20.0, 1.0, -4.0));
        assert!(cam.is_visible(&straddling));
    }
}
