//! # Overlay Placement
//!
//! Registers a flat 2D panel onto a 3D screen surface: where it sits, how it
//! is turned, and how large its native pixels are in world units.

use cgmath::{InnerSpace, Matrix4, Quaternion, Rad, Rotation, Rotation3, Vector3, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomError};
use crate::gfx::scene::{NodeId, SceneGraph};
use crate::navigation::StageId;

/// Per-stage tuning for the panel laid over a stage's screen.
///
/// Offsets and push are world units along the screen's right, up and normal
/// axes. Rotations are radians about those same axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub stage: StageId,
    pub native_width: f32,
    pub native_height: f32,
    pub pixels_per_unit: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub push: f32,
    pub normal_flip: bool,
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    pub aspect_x: f32,
    pub aspect_y: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stage: StageId::new(""),
            native_width: 1024.0,
            native_height: 576.0,
            pixels_per_unit: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            push: 0.0,
            normal_flip: false,
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 0.0,
            aspect_x: 1.0,
            aspect_y: 1.0,
            min_scale: 0.0005,
            max_scale: 0.05,
        }
    }
}

impl OverlayConfig {
    pub fn tv() -> Self {
        Self {
            stage: StageId::new("tv"),
            pixels_per_unit: 7.6,
            offset_x: -9.7,
            offset_y: -3.1,
            push: -2.8,
            rot_y: 0.9,
            rot_z: 0.03,
            aspect_x: 1.32,
            aspect_y: 0.7,
            ..Self::default()
        }
    }

    pub fn computer() -> Self {
        Self {
            stage: StageId::new("computer"),
            pixels_per_unit: 0.6,
            offset_x: 0.009,
            offset_y: 0.009,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| {
            Err(RoomError::InvalidConfig(format!(
                "overlay '{}': {}",
                self.stage, msg
            )))
        };

        if self.stage.as_str().is_empty() {
            return invalid("stage must be set");
        }
        let numbers = [
            self.native_width,
            self.native_height,
            self.pixels_per_unit,
            self.offset_x,
            self.offset_y,
            self.push,
            self.rot_x,
            self.rot_y,
            self.rot_z,
            self.aspect_x,
            self.aspect_y,
            self.min_scale,
            self.max_scale,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return invalid("all numbers must be finite");
        }
        if self.native_width <= 0.0 || self.native_height <= 0.0 {
            return invalid("native size must be positive");
        }
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return invalid("scale range must satisfy 0 < min_scale <= max_scale");
        }
        Ok(())
    }

    /// Clamps one scale component; non-finite values collapse to `min_scale`
    pub fn clamp_scale(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min_scale;
        }
        value.clamp(self.min_scale, self.max_scale)
    }
}

/// World transform of an overlay panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl OverlayPlacement {
    /// Translation, then rotation, then scale, ready for the compositor
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.orientation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Places `config`'s panel over the `screen` node as it currently sits in the world
pub fn compute_placement(config: &OverlayConfig, graph: &SceneGraph, screen: NodeId) -> OverlayPlacement {
    let bounds = graph.world_bounds(screen);
    let (center, size) = if bounds.is_empty() || !bounds.is_finite() {
        (Vector3::zero(), Vector3::zero())
    } else {
        (bounds.center(), bounds.size())
    };

    let rotation = graph.world_rotation(screen);
    let right = rotation.rotate_vector(Vector3::unit_x()).normalize();
    let up = rotation.rotate_vector(Vector3::unit_y()).normalize();
    let mut normal = rotation.rotate_vector(Vector3::unit_z()).normalize();
    if config.normal_flip {
        normal = -normal;
    }

    let position = center + right * config.offset_x + up * config.offset_y + normal * config.push;

    let qx = Quaternion::from_axis_angle(right, Rad(config.rot_x));
    let qy = Quaternion::from_axis_angle(up, Rad(config.rot_y));
    let qz = Quaternion::from_axis_angle(normal, Rad(config.rot_z));
    let orientation = rotation * qz * qy * qx;

    let sx = size.x * config.pixels_per_unit / config.native_width * config.aspect_x;
    let sy = size.y * config.pixels_per_unit / config.native_height * config.aspect_y;

    OverlayPlacement {
        position,
        orientation,
        scale: Vector3::new(config.clamp_scale(sx), config.clamp_scale(sy), 1.0),
    }
}
