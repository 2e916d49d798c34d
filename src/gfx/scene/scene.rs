use cgmath::{Matrix4, One, Quaternion, SquareMatrix};
use log::warn;

use crate::gfx::picking::{ray_intersect_triangle, transform_point, PickHit, Ray, AABB};

use super::object::{Node, NodeId};

/// Arena-backed scene graph of the loaded room model.
///
/// Nodes refer to their parent by [`NodeId`], so subtree membership is an
/// explicit walk up the parent chain rather than object identity.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a node under `parent` (or as a top-level node) and returns its handle.
    ///
    /// An unknown parent handle is reported and the node is added at top level.
    pub fn add_node(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = match parent {
            Some(p) if self.contains(p) => Some(p),
            Some(p) => {
                warn!("[SceneGraph] parent {:?} of '{}' does not exist", p, node.name);
                None
            }
            None => None,
        };
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// First node with this exact name, in insertion order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Depth-first search of `root` and its descendants for an exact name
    pub fn find_in_subtree(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }

    /// `root` followed by all of its descendants, depth-first pre-order
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Walks the parent chain of `node` looking for `ancestor`. A node counts
    /// as a descendant of itself.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|i| self.node(i)) {
            matrix = node.local_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Composition of the local rotations from the top of the hierarchy down to `id`
    pub fn world_rotation(&self, id: NodeId) -> Quaternion<f32> {
        let mut rotation = Quaternion::one();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|i| self.node(i)) {
            rotation = node.rotation * rotation;
            current = node.parent;
        }
        rotation
    }

    /// World-space box around the geometry of `id` and all its descendants.
    /// Empty when the subtree carries no geometry.
    pub fn world_bounds(&self, id: NodeId) -> AABB {
        self.world_bounds_filtered(id, |_| true)
    }

    /// Like [`world_bounds`](Self::world_bounds) but only nodes accepted by `include` contribute
    pub fn world_bounds_filtered<F>(&self, id: NodeId, include: F) -> AABB
    where
        F: Fn(&Node) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter_map(|i| {
                let node = &self.nodes[i.0];
                let geometry = node.geometry.as_ref()?;
                include(node).then(|| geometry.bounds().transform(&self.world_matrix(i)))
            })
            .fold(AABB::empty(), |acc, b| acc.union(&b))
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
    }

    /// A node is drawn (and pickable) only when it and all its ancestors are visible
    pub fn is_visible_in_world(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|i| self.node(i)) {
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        self.contains(id)
    }

    /// Intersects `ray` with every visible node carrying geometry under `root`.
    ///
    /// Hits are sorted nearest-first. Nodes with triangles are tested exactly;
    /// geometry without triangles is hit through its bounding box.
    pub fn raycast(&self, ray: &Ray, root: NodeId) -> Vec<PickHit> {
        let mut hits = Vec::new();

        for id in self.descendants(root) {
            let node = &self.nodes[id.0];
            let Some(geometry) = node.geometry.as_ref() else {
                continue;
            };
            if !self.is_visible_in_world(id) {
                continue;
            }

            let world = self.world_matrix(id);
            let Some(box_distance) = geometry.bounds().transform(&world).intersect_ray(ray) else {
                continue;
            };

            let distance = if geometry.has_triangles() {
                geometry
                    .triangles()
                    .filter_map(|[a, b, c]| {
                        ray_intersect_triangle(
                            ray,
                            transform_point(&world, a),
                            transform_point(&world, b),
                            transform_point(&world, c),
                        )
                    })
                    .fold(None, |nearest: Option<f32>, t| {
                        Some(nearest.map_or(t, |n| n.min(t)))
                    })
            } else {
                Some(box_distance)
            };

            if let Some(distance) = distance {
                hits.push(PickHit {
                    node: id,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Names of all nodes, in insertion order
    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::Geometry;
    use cgmath::{Deg, InnerSpace, Rotation, Rotation3, Vector3};

    fn nested_graph() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::new("Room"), None);
        let tv = graph.add_node(
            Node::new("TV_Third").with_translation(Vector3::new(2.0, 0.0, 0.0)),
            Some(root),
        );
        let screen = graph.add_node(
            Node::new("TV_Screen")
                .with_translation(Vector3::new(0.0, 1.0, 0.0))
                .with_geometry(Geometry::quad(1.0, 0.5)),
            Some(tv),
        );
        (graph, root, tv, screen)
    }

    #[test]
    fn test_find_and_ancestry() {
        let (graph, root, tv, screen) = nested_graph();
        assert_eq!(graph.find_by_name("TV_Screen"), Some(screen));
        assert_eq!(graph.find_in_subtree(tv, "TV_Screen"), Some(screen));
        assert_eq!(graph.find_in_subtree(screen, "TV_Third"), None);
        assert!(graph.is_descendant_of(screen, root));
        assert!(graph.is_descendant_of(screen, screen));
        assert!(!graph.is_descendant_of(tv, screen));
        assert_eq!(graph.descendants(root), vec![root, tv, screen]);
    }

    #[test]
    fn test_unknown_parent_becomes_top_level() {
        let mut graph = SceneGraph::new();
        let orphan = graph.add_node(Node::new("Orphan"), Some(NodeId(42)));
        assert_eq!(graph.parent(orphan), None);
    }

    #[test]
    fn test_world_bounds_follow_hierarchy() {
        let (graph, root, _, screen) = nested_graph();
        let bounds = graph.world_bounds(screen);
        assert!((bounds.center() - Vector3::new(2.0, 1.0, 0.0)).magnitude() < 1e-5);
        assert_eq!(graph.world_bounds(root), bounds);
    }

    #[test]
    fn test_world_rotation_composes_parents() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(
            Node::new("A").with_rotation(Quaternion::from_angle_y(Deg(90.0))),
            None,
        );
        let b = graph.add_node(
            Node::new("B").with_rotation(Quaternion::from_angle_y(Deg(90.0))),
            Some(a),
        );
        let forward = graph.world_rotation(b).rotate_vector(Vector3::unit_z());
        assert!((forward - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_raycast_nearest_first_and_skips_hidden() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(Node::new("Room"), None);
        let far = graph.add_node(
            Node::new("Far").with_geometry(Geometry::cuboid([-1.0, -1.0, -6.0], [1.0, 1.0, -5.0])),
            Some(root),
        );
        let near = graph.add_node(
            Node::new("Near").with_geometry(Geometry::cuboid([-1.0, -1.0, -3.0], [1.0, 1.0, -2.0])),
            Some(root),
        );

        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let hits = graph.raycast(&ray, root);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert!((hits[0].distance - 2.0).abs() < 1e-4);
        assert_eq!(hits[1].node, far);

        graph.set_visible(near, false);
        let hits = graph.raycast(&ray, root);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, far);
    }
}
