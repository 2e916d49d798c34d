use cgmath::{InnerSpace, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, Modifiers, MouseScrollDelta},
};

use super::orbit_camera::{calculate_cartesian_eye_position, OrbitCamera};

/// Residual deltas below this are dropped when damping decays them
const DELTA_EPSILON: f32 = 1.0e-5;

#[derive(Debug, Clone, Copy)]
pub struct OrbitBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitBounds {
    fn default() -> Self {
        Self {
            min_distance: 0.05,
            max_distance: 50.0,
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
        }
    }
}

/// Orbit-style user camera controls.
///
/// Pointer drags rotate around `target`, shift-drags pan, the wheel zooms.
/// Input only accumulates while `enabled`; [`update`](Self::update) applies
/// it and keeps the camera pointed at `target`.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub target: Vector3<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub bounds: OrbitBounds,
    yaw_delta: f32,
    pitch_delta: f32,
    zoom_delta: f32,
    pan_delta: (f32, f32),
    is_shift_held: bool,
    is_mouse_pressed: bool,
}

impl OrbitControls {
    pub fn new(target: Vector3<f32>) -> Self {
        Self {
            enabled: true,
            enable_damping: true,
            damping_factor: 0.05,
            target,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
            bounds: OrbitBounds::default(),
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            zoom_delta: 0.0,
            pan_delta: (0.0, 0.0),
            is_shift_held: false,
            is_mouse_pressed: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear_deltas();
            self.is_mouse_pressed = false;
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent) {
        if !self.enabled {
            return;
        }
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 * 0.05
                    }
                };
                self.zoom(scroll_amount);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    if self.is_shift_held {
                        // SHIFT + DRAG = PAN (move focus point)
                        self.pan(-delta.0 as f32, delta.1 as f32);
                    } else {
                        // NORMAL DRAG = ROTATE (orbit around focus)
                        self.rotate(-delta.0 as f32, -delta.1 as f32);
                    }
                }
            }
            _ => (),
        }
    }

    /// Tracks the shift modifier that turns drags into pans
    pub fn process_modifiers(&mut self, modifiers: &Modifiers) {
        self.is_shift_held = modifiers.state().shift_key();
    }

    /// Queue an orbit rotation, in pointer pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if self.enabled {
            self.yaw_delta += dx * self.rotate_speed;
            self.pitch_delta += dy * self.rotate_speed;
        }
    }

    /// Queue a zoom; positive values move away from the target
    pub fn zoom(&mut self, amount: f32) {
        if self.enabled {
            self.zoom_delta += amount * self.zoom_speed;
        }
    }

    /// Queue a pan, in pointer pixels
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if self.enabled {
            self.pan_delta.0 += dx * self.pan_speed;
            self.pan_delta.1 += dy * self.pan_speed;
        }
    }

    pub fn has_pending_motion(&self) -> bool {
        self.yaw_delta != 0.0
            || self.pitch_delta != 0.0
            || self.zoom_delta != 0.0
            || self.pan_delta != (0.0, 0.0)
    }

    /// Applies pending input around `target` and points the camera at it.
    ///
    /// Without pending input the eye is left exactly where it is.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if self.enabled && self.has_pending_motion() {
            let step = if self.enable_damping {
                self.damping_factor
            } else {
                1.0
            };

            let offset = camera.eye - self.target;
            let radius = offset.magnitude().max(self.bounds.min_distance);
            let yaw = offset.x.atan2(offset.z) + self.yaw_delta * step;
            let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + self.pitch_delta * step)
                .clamp(self.bounds.min_pitch, self.bounds.max_pitch);
            let distance = (radius * (1.0 + self.zoom_delta * step))
                .clamp(self.bounds.min_distance, self.bounds.max_distance);

            // Pan in the camera's screen plane, scaled by distance for a consistent feel
            let forward = camera.forward();
            let right = forward.cross(camera.up).normalize();
            let up = right.cross(forward).normalize();
            let pan_scale = distance * 0.1 * step;
            self.target += right * self.pan_delta.0 * pan_scale + up * self.pan_delta.1 * pan_scale;

            camera.eye = calculate_cartesian_eye_position(pitch, yaw, distance, self.target);

            if self.enable_damping {
                let keep = 1.0 - self.damping_factor;
                self.yaw_delta *= keep;
                self.pitch_delta *= keep;
                self.zoom_delta *= keep;
                self.pan_delta = (self.pan_delta.0 * keep, self.pan_delta.1 * keep);
                self.drop_residue();
            } else {
                self.clear_deltas();
            }
        }

        camera.look_at(self.target);
    }

    fn drop_residue(&mut self) {
        for value in [
            &mut self.yaw_delta,
            &mut self.pitch_delta,
            &mut self.zoom_delta,
            &mut self.pan_delta.0,
            &mut self.pan_delta.1,
        ] {
            if value.abs() < DELTA_EPSILON {
                *value = 0.0;
            }
        }
    }

    fn clear_deltas(&mut self) {
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
        self.zoom_delta = 0.0;
        self.pan_delta = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;
    use winit::keyboard::ModifiersState;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0)
    }

    #[test]
    fn test_update_without_input_keeps_eye() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vector3::new(0.0, 1.0, 0.0));
        controls.update(&mut camera);
        assert_eq!(camera.eye, Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.target, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vector3::zero());
        controls.enable_damping = false;
        controls.rotate(100.0, 0.0);
        controls.update(&mut camera);

        assert!((camera.eye.magnitude() - 5.0).abs() < 1e-4);
        assert!(camera.eye.x.abs() > 0.1);
        assert!(!controls.has_pending_motion());
    }

    #[test]
    fn test_damping_spreads_motion_over_frames() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vector3::zero());
        controls.rotate(100.0, 0.0);
        controls.update(&mut camera);
        assert!(controls.has_pending_motion());
    }

    #[test]
    fn test_shift_drag_pans_target() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vector3::zero());
        controls.enable_damping = false;
        controls.process_modifiers(&ModifiersState::SHIFT.into());
        controls.process_events(&DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        });
        controls.process_events(&DeviceEvent::MouseMotion { delta: (-20.0, 0.0) });
        controls.update(&mut camera);

        assert!(controls.target.x > 0.0);
        assert!(controls.target.y.abs() < 1e-5);
        assert!(((camera.eye - controls.target).magnitude() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_plain_drag_rotates_after_shift_release() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vector3::zero());
        controls.enable_damping = false;
        controls.process_modifiers(&ModifiersState::SHIFT.into());
        controls.process_modifiers(&ModifiersState::empty().into());
        controls.process_events(&DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        });
        controls.process_events(&DeviceEvent::MouseMotion { delta: (-20.0, 0.0) });
        controls.update(&mut camera);

        assert_eq!(controls.target, Vector3::zero());
        assert!(camera.eye.x.abs() > 0.01);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(Vector3::zero());
        controls.rotate(100.0, 0.0);
        controls.set_enabled(false);
        assert!(!controls.has_pending_motion());

        controls.zoom(3.0);
        controls.update(&mut camera);
        assert_eq!(camera.eye, Vector3::new(0.0, 0.0, 5.0));
    }
}
