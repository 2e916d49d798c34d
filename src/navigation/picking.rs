//! # Stage Picking
//!
//! Resolves what is under the pointer to a stage. Pure reads: safe to call on
//! every pointer move for hover feedback.

use cgmath::Vector2;

use crate::gfx::camera::OrbitCamera;
use crate::gfx::scene::{NodeId, SceneGraph};

use super::stage::{StageId, StageRegistry};

/// A stage under the pointer and the node the camera should frame for it
#[derive(Debug, Clone, PartialEq)]
pub struct StagePick {
    pub stage: StageId,
    pub focus: NodeId,
}

/// Casts a ray through `ndc` into `root`'s subtree and returns the first hit,
/// nearest-first, that belongs to a stage.
pub fn pick_stage(
    ndc: Vector2<f32>,
    camera: &OrbitCamera,
    graph: &SceneGraph,
    root: NodeId,
    registry: &StageRegistry,
) -> Option<StagePick> {
    let ray = camera.ray_from_ndc(ndc);
    graph
        .raycast(&ray, root)
        .into_iter()
        .find_map(|hit| resolve_node(hit.node, graph, registry))
}

/// Maps a hit node to its stage.
///
/// Stages are tried in registry order. A stage matches when the hit is its
/// screen or lies under its root, so when stages nest the earlier one wins.
pub fn resolve_node(node: NodeId, graph: &SceneGraph, registry: &StageRegistry) -> Option<StagePick> {
    let stage = registry.iter().find(|stage| {
        stage.screen == Some(node)
            || stage
                .root
                .is_some_and(|root| graph.is_descendant_of(node, root))
    })?;

    Some(StagePick {
        stage: stage.id().clone(),
        focus: stage.default_focus().unwrap_or(node),
    })
}
