//! # Room Model Loading
//!
//! Turns an OBJ file into a [`SceneGraph`]. OBJ has no hierarchy of its own, so
//! object names containing `/` are read as paths: `TV_Third/TV_Screen` becomes
//! a `TV_Screen` node under a `TV_Third` group node.

use std::path::Path;

use cgmath::Vector3;
use log::{info, warn};

use crate::error::Result;

use super::object::{Geometry, Node, NodeId};
use super::scene::SceneGraph;

/// Loads an OBJ file. The root node is named after the file stem.
pub fn load_obj(path: impl AsRef<Path>) -> Result<(SceneGraph, NodeId)> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let root_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Scene");
    let (graph, root) = graph_from_models(root_name, &models);
    info!(
        "[loader] {} -> {} nodes from {} OBJ objects",
        path.display(),
        graph.len(),
        models.len()
    );
    Ok((graph, root))
}

/// Builds a scene graph from already parsed OBJ models
pub fn graph_from_models(root_name: &str, models: &[tobj::Model]) -> (SceneGraph, NodeId) {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new(root_name), None);

    for (i, model) in models.iter().enumerate() {
        let name = if model.name.is_empty() {
            format!("object_{}", i)
        } else {
            model.name.clone()
        };

        let mut segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();
        let leaf = segments.pop().unwrap_or("object").to_string();

        let mut parent = root;
        for group in segments {
            parent = match child_named(&graph, parent, group) {
                Some(existing) => existing,
                None => graph.add_node(Node::new(group), Some(parent)),
            };
        }

        let geometry = Geometry::from_flat(&model.mesh.positions, model.mesh.indices.clone());
        graph.add_node(Node::new(leaf).with_geometry(geometry), Some(parent));
    }

    (graph, root)
}

fn child_named(graph: &SceneGraph, parent: NodeId, name: &str) -> Option<NodeId> {
    graph
        .node(parent)?
        .children()
        .iter()
        .copied()
        .find(|c| graph.name(*c) == Some(name))
}

/// Nodes left out when measuring the room for placement: shop props that may
/// be hidden, and the night-time overlay copies of baked meshes.
pub fn is_placement_excluded(name: &str) -> bool {
    name.starts_with("SHOP") || name.contains("__NightOverlay")
}

/// Centres the room on X/Z and rests its lowest point on `floor_offset`.
///
/// Returns false (and leaves the room untouched) when no measurable geometry
/// remains after the exclusions.
pub fn place_on_floor(graph: &mut SceneGraph, root: NodeId, floor_offset: f32) -> bool {
    let bounds = graph.world_bounds_filtered(root, |node| !is_placement_excluded(&node.name));
    if bounds.is_empty() || !bounds.is_finite() {
        warn!("[loader] room bounds empty after filters; skipping placement");
        return false;
    }

    let center = bounds.center();
    let Some(node) = graph.node_mut(root) else {
        return false;
    };
    node.translation -= Vector3::new(center.x, 0.0, center.z);
    node.translation.y -= bounds.min.y;
    node.translation.y += floor_offset;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROOM_OBJ: &str = "\
o Floor
v -2 0 -2
v 2 0 -2
v 2 0 2
v -2 0 2
f 1 2 3
f 1 3 4
o TV_Third/TV_Screen
v 0 1 -1
v 1 1 -1
v 1 2 -1
f 5 6 7
o TV_Third/TV_Stand
v 0 0 -1
v 1 0 -1
v 1 1 -1
f 8 9 10
";

    #[test]
    fn test_load_obj_builds_hierarchy() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        file.write_all(ROOM_OBJ.as_bytes()).unwrap();

        let (graph, root) = load_obj(file.path()).unwrap();
        let tv = graph.find_in_subtree(root, "TV_Third").unwrap();
        let screen = graph.find_in_subtree(root, "TV_Screen").unwrap();
        let stand = graph.find_in_subtree(root, "TV_Stand").unwrap();

        assert_eq!(graph.parent(screen), Some(tv));
        assert_eq!(graph.parent(stand), Some(tv));
        assert!(graph.node(tv).unwrap().geometry.is_none());
        assert_eq!(graph.node(screen).unwrap().geometry.as_ref().unwrap().vertex_count(), 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_obj("/definitely/not/here.obj").is_err());
    }

    #[test]
    fn test_place_on_floor_ignores_shop_nodes() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::new("Room"), None);
        graph.add_node(
            Node::new("Desk").with_geometry(Geometry::cuboid([1.0, 2.0, 1.0], [3.0, 4.0, 3.0])),
            Some(root),
        );
        graph.add_node(
            Node::new("SHOP_Rocket")
                .with_geometry(Geometry::cuboid([-10.0, -10.0, -10.0], [-9.0, -9.0, -9.0])),
            Some(root),
        );

        assert!(place_on_floor(&mut graph, root, -1.5));
        let t = graph.node(root).unwrap().translation;
        assert_eq!(t, Vector3::new(-2.0, -3.5, -2.0));
    }

    #[test]
    fn test_place_on_floor_without_geometry() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::new("Room"), None);
        assert!(!place_on_floor(&mut graph, root, -1.5));
        assert_eq!(graph.node(root).unwrap().translation, Vector3::new(0.0, 0.0, 0.0));
    }
}
