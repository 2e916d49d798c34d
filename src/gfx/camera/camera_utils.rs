use cgmath::{Matrix4, Vector3};
use winit::event::{DeviceEvent, Modifiers};

use super::{camera_controller::OrbitControls, orbit_camera::OrbitCamera};

/// Eye position plus the point it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
}

impl CameraPose {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>) -> Self {
        Self { position, target }
    }
}

/// Owns the live camera and its optional user controls.
///
/// Everything that moves the camera goes through here, so the controls'
/// target and the camera's look target never drift apart.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controls: Option<OrbitControls>,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controls: Option<OrbitControls>) -> Self {
        Self { camera, controls }
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        if let Some(controls) = self.controls.as_mut() {
            controls.process_events(event);
        }
    }

    pub fn process_modifiers(&mut self, modifiers: &Modifiers) {
        if let Some(controls) = self.controls.as_mut() {
            controls.process_modifiers(modifiers);
        }
    }

    /// The controls' orbit target when controls exist, the camera's own look target otherwise
    pub fn look_target(&self) -> Vector3<f32> {
        match &self.controls {
            Some(controls) => controls.target,
            None => self.camera.target,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.camera.eye, self.look_target())
    }

    /// Moves the eye and re-aims the camera. With controls present the target
    /// is handed to them and they update the camera; otherwise the camera
    /// looks at the target directly.
    pub fn apply_pose(&mut self, pose: CameraPose) {
        self.camera.eye = pose.position;
        match self.controls.as_mut() {
            Some(controls) => {
                controls.target = pose.target;
                controls.update(&mut self.camera);
            }
            None => self.camera.look_at(pose.target),
        }
    }

    /// Locks or unlocks user control; damping follows the same switch
    pub fn set_controls_locked(&mut self, locked: bool) {
        if let Some(controls) = self.controls.as_mut() {
            controls.set_enabled(!locked);
            controls.enable_damping = !locked;
        }
    }

    pub fn controls_locked(&self) -> bool {
        self.controls.as_ref().is_some_and(|c| !c.enabled)
    }

    /// Per-frame controls update (user orbiting, damping)
    pub fn update(&mut self) {
        if let Some(controls) = self.controls.as_mut() {
            controls.update(&mut self.camera);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    /// View-projection matrix for the external renderer's camera uniform
    pub fn get_view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};

    #[test]
    fn test_view_proj_centers_look_target() {
        let camera = OrbitCamera::new(Vector3::new(0.0, 3.0, 10.0), Vector3::new(0.0, 1.0, 0.0), 1.5);
        let manager = CameraManager::new(camera, None);
        let view_proj = manager.get_view_proj_matrix();

        let clip = view_proj * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);

        // Behind the eye ends up with negative w
        let behind = view_proj * Vector4::new(0.0, 3.0, 20.0, 1.0);
        assert!(behind.w < 0.0);
    }

    #[test]
    fn test_apply_pose_without_controls() {
        let camera = OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        let mut manager = CameraManager::new(camera, None);
        let pose = CameraPose::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0));
        manager.apply_pose(pose);
        assert_eq!(manager.pose(), pose);
        assert_eq!(manager.camera.target, pose.target);
    }

    #[test]
    fn test_apply_pose_drives_controls() {
        let camera = OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        let mut manager = CameraManager::new(camera, Some(OrbitControls::new(Vector3::zero())));
        manager.set_controls_locked(true);
        assert!(manager.controls_locked());

        let pose = CameraPose::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0));
        manager.apply_pose(pose);
        assert_eq!(manager.pose(), pose);
        assert_eq!(manager.controls.as_ref().unwrap().target, pose.target);
        assert_eq!(manager.camera.target, pose.target);

        manager.set_controls_locked(false);
        let controls = manager.controls.as_ref().unwrap();
        assert!(controls.enabled && controls.enable_damping);
    }
}
