//! # Target Pose
//!
//! Where the camera goes to frame a stage. The approach is computed in the
//! focus object's own frame, so a rotated TV still gets a head-on shot.

use cgmath::{InnerSpace, Rotation, Vector3, Zero};
use log::warn;

use crate::gfx::camera::CameraPose;
use crate::gfx::scene::{NodeId, SceneGraph};

use super::stage::StageConfig;

/// The pose to animate to and how long the animation takes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    pub pose: CameraPose,
    pub duration: f32,
}

/// World-space center of a node's geometry, falling back to the origin when
/// the node has no usable bounds. Zero-thickness boxes (flat screens) keep
/// their real center.
pub fn focus_center(graph: &SceneGraph, focus: NodeId) -> Vector3<f32> {
    let bounds = graph.world_bounds(focus);
    if bounds.is_empty() || !bounds.is_finite() {
        warn!(
            "[Navigation] '{}' has no usable bounds, framing the world origin",
            graph.name(focus).unwrap_or("?")
        );
        return Vector3::zero();
    }
    bounds.center()
}

/// Computes the approach pose for `config` around `focus`.
///
/// Without a focus node the current pose is returned unchanged, so a request
/// against a half-bound stage still runs a (motionless) transition.
pub fn compute_target_pose(
    config: &StageConfig,
    focus: Option<NodeId>,
    graph: &SceneGraph,
    current: CameraPose,
) -> TargetPose {
    let Some(focus) = focus.filter(|id| graph.contains(*id)) else {
        warn!("[Navigation] stage '{}' has nothing to focus", config.id);
        return TargetPose {
            pose: current,
            duration: config.duration_in,
        };
    };

    let center = focus_center(graph, focus);
    let rotation = graph.world_rotation(focus);

    let mut forward = rotation.rotate_vector(Vector3::unit_z()).normalize();
    let right = rotation.rotate_vector(Vector3::unit_x()).normalize();
    let up = rotation.rotate_vector(Vector3::unit_y()).normalize();

    // Approach from the side the camera is already on
    if forward.dot(current.position - center) < 0.0 {
        forward = -forward;
    }

    let position = center
        + forward * config.approach_distance
        + right * config.lateral_offset
        + up * config.vertical_offset;
    let target = center + up * config.target_vertical_offset;

    TargetPose {
        pose: CameraPose::new(position, target),
        duration: config.duration_in,
    }
}
