use crate::gfx::picking::{transform_point, Ray};
use cgmath::*;

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(23.0).into(),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn with_fov(mut self, fovy: impl Into<Rad<f32>>) -> Self {
        self.fovy = fovy.into();
        self
    }

    pub fn with_clip_planes(mut self, znear: f32, zfar: f32) -> Self {
        self.znear = znear;
        self.zfar = zfar;
        self
    }

    /// Points the camera at `target` without moving the eye
    pub fn look_at(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    /// Unit vector from the eye towards the look target
    pub fn forward(&self) -> Vector3<f32> {
        let dir = self.target - self.eye;
        if dir.magnitude2() <= f32::EPSILON {
            -Vector3::unit_z()
        } else {
            dir.normalize()
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.eye + self.forward());
        Matrix4::look_at_rh(eye, target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Casts a world-space ray through a normalized device coordinate
    /// (x and y in -1..1, +y up).
    pub fn ray_from_ndc(&self, ndc: Vector2<f32>) -> Ray {
        let view_proj = self.build_view_projection_matrix();
        let Some(inv_view_proj) = view_proj.invert() else {
            return Ray::new(self.eye, self.forward());
        };

        // Transform near and far points from NDC to world space
        let near = transform_point(&inv_view_proj, Vector3::new(ndc.x, ndc.y, -1.0));
        let far = transform_point(&inv_view_proj, Vector3::new(ndc.x, ndc.y, 1.0));

        let direction = far - near;
        if direction.magnitude2() <= f32::EPSILON {
            return Ray::new(self.eye, self.forward());
        }
        Ray::new(near, direction)
    }
}

/// Eye position on a sphere of radius `distance` around `target`
pub(crate) fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_follows_view_direction() {
        let camera = OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.5);
        let ray = camera.ray_from_ndc(Vector2::new(0.0, 0.0));
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!(ray.origin.z < 5.0 && ray.origin.z > 4.8);
    }

    #[test]
    fn test_offset_ray_leans_right() {
        let camera = OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        let ray = camera.ray_from_ndc(Vector2::new(0.5, 0.0));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y.abs() < 1e-4);
    }

    #[test]
    fn test_resize_ignores_zero_height() {
        let mut camera = OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        camera.resize_projection(1200, 0);
        assert_eq!(camera.aspect, 1.0);
        camera.resize_projection(1200, 800);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_cartesian_eye_position() {
        let eye = calculate_cartesian_eye_position(0.0, 0.0, 2.0, Vector3::new(1.0, 0.0, 0.0));
        assert!((eye - Vector3::new(1.0, 0.0, 2.0)).magnitude() < 1e-6);
    }
}
