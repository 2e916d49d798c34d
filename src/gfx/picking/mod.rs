//! # Ray Casting Primitives
//!
//! Rays, axis-aligned bounding boxes and triangle tests used to pick scene
//! nodes under the pointer.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: the camera unprojects a normalized device coordinate
//!    into a world-space [`Ray`] (see [`OrbitCamera::ray_from_ndc`]).
//! 2. **Broad phase**: each node's world [`AABB`] is tested against the ray.
//! 3. **Narrow phase**: nodes carrying triangles are tested triangle by
//!    triangle, the nearest hit wins.
//!
//! The scene graph drives the traversal in
//! [`SceneGraph::raycast`](crate::gfx::scene::SceneGraph::raycast).
//!
//! [`OrbitCamera::ray_from_ndc`]: crate::gfx::camera::OrbitCamera::ray_from_ndc

use cgmath::{ElementWise, InnerSpace, Matrix4, Vector3, Vector4, Zero};

use crate::gfx::scene::NodeId;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// An inverted box that contains nothing; growing it with any point yields
    /// a box around that point.
    pub fn empty() -> Self {
        Self::new(
            Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        )
    }

    /// Create AABB from a set of vertices. An empty slice gives [`AABB::empty`].
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let mut aabb = Self::empty();
        for vertex in vertices {
            aabb.expand_point(Vector3::new(vertex[0], vertex[1], vertex[2]));
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True when both corners are finite numbers
    pub fn is_finite(&self) -> bool {
        [self.min, self.max]
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite())
    }

    pub fn expand_point(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &AABB) -> AABB {
        if other.is_empty() {
            return *self;
        }
        let mut merged = *self;
        merged.expand_point(other.min);
        merged.expand_point(other.max);
        merged
    }

    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.max - self.min
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        if self.is_empty() {
            return *self;
        }

        // Transform all 8 corners of the AABB and compute new bounds
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut transformed = Self::empty();
        for corner in &corners {
            transformed.expand_point(transform_point(matrix, *corner));
        }
        transformed
    }
}

/// Transform a point by an affine (or projective) matrix
pub fn transform_point(matrix: &Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
    let homogeneous = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    Vector3::new(
        homogeneous.x / homogeneous.w,
        homogeneous.y / homogeneous.w,
        homogeneous.z / homogeneous.w,
    )
}

/// Möller–Trumbore ray/triangle test, double sided.
pub fn ray_intersect_triangle(
    ray: &Ray,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
) -> Option<f32> {
    let eps = 1.0e-7;
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < eps {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = ray.origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    if t > eps {
        Some(t)
    } else {
        None
    }
}

/// A single ray hit against a scene node
#[derive(Debug, Clone, Copy)]
pub struct PickHit {
    /// The node whose geometry was hit
    pub node: NodeId,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub point: Vector3<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.center(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_empty_aabb() {
        let aabb = AABB::from_vertices(&[]);
        assert!(aabb.is_empty());
        assert!(!aabb.is_finite());
        assert_eq!(aabb.center(), Vector3::zero());

        let unit = AABB::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.union(&unit), unit);
        assert_eq!(unit.union(&aabb), unit);
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        // Ray hitting the box
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = aabb.intersect_ray(&ray).unwrap();
        assert!((hit - 4.0).abs() < 1e-5);

        // Ray missing the box
        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());

        // Box behind the ray
        let ray_away = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect_ray(&ray_away).is_none());
    }

    #[test]
    fn test_aabb_transform() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let moved = aabb.transform(&Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vector3::new(1.0, -1.0, -1.0));
        assert_eq!(moved.max, Vector3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_triangle_intersection() {
        let a = Vector3::new(-1.0, -1.0, 0.0);
        let b = Vector3::new(1.0, -1.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);

        let ray = Ray::new(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        let t = ray_intersect_triangle(&ray, a, b, c).unwrap();
        assert!((t - 3.0).abs() < 1e-5);

        let beside = Ray::new(Vector3::new(2.0, 2.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ray_intersect_triangle(&beside, a, b, c).is_none());

        let parallel = Ray::new(Vector3::new(0.0, 0.0, 3.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(ray_intersect_triangle(&parallel, a, b, c).is_none());
    }
}
