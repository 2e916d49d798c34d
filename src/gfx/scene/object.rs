use cgmath::{Deg, Matrix4, One, Quaternion, Rotation3, Vector3};

use crate::gfx::picking::AABB;

/// Stable handle to a node inside a [`SceneGraph`](super::SceneGraph).
///
/// Handles are plain indices: they stay valid for the lifetime of the graph
/// because nodes are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Triangle geometry in node-local space
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
    bounds: AABB,
}

impl Geometry {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let bounds = AABB::from_vertices(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Build from the flat `x, y, z, x, y, z, ...` layout OBJ loaders produce
    pub fn from_flat(positions: &[f32], indices: Vec<u32>) -> Self {
        let positions = positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        Self::new(positions, indices)
    }

    /// Axis-aligned box spanning `min..max`, twelve triangles
    pub fn cuboid(min: [f32; 3], max: [f32; 3]) -> Self {
        let positions = vec![
            [min[0], min[1], min[2]],
            [max[0], min[1], min[2]],
            [max[0], max[1], min[2]],
            [min[0], max[1], min[2]],
            [min[0], min[1], max[2]],
            [max[0], min[1], max[2]],
            [max[0], max[1], max[2]],
            [min[0], max[1], max[2]],
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 6, 2, 3, 7, 6, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(positions, indices)
    }

    /// Flat rectangle in the local XY plane facing +Z, centred on the origin
    pub fn quad(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::new(
            vec![[-hw, -hh, 0.0], [hw, -hh, 0.0], [hw, hh, 0.0], [-hw, hh, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_triangles(&self) -> bool {
        self.indices.len() >= 3
    }

    /// Local-space triangles; index triples pointing outside the vertex list are skipped
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = self.positions.get(tri[0] as usize)?;
            let b = self.positions.get(tri[1] as usize)?;
            let c = self.positions.get(tri[2] as usize)?;
            Some([Vector3::from(*a), Vector3::from(*b), Vector3::from(*c)])
        })
    }
}

/// A named node of the room model
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    pub geometry: Option<Geometry>,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Create a new node with identity transformation and no geometry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            geometry: None,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_translation(mut self, translation: Vector3<f32>) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set rotation around Y axis
    pub fn set_rotation_y(&mut self, angle: Deg<f32>) {
        self.rotation = Quaternion::from_angle_y(angle);
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform, composed as T * R * S
    pub fn local_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.translation);
        let r = Matrix4::from(self.rotation);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s
    }
}
