//! Triangle mesh geometry.
//!
//! A [`Mesh`] owns flat vertex buffers plus a triangle index buffer and
//! answers the per-triangle questions the acceleration index asks of it:
//! how many triangles, where each one sits, and where a ray crosses it.

use lumen_math::{Aabb, Ray, Vec2, Vec3};
use thiserror::Error;

/// Determinant magnitude below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Errors found by [`Mesh::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("triangle {triangle} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{attribute} buffer has {len} entries, expected one per vertex ({vertex_count})")]
    AttributeLength {
        attribute: &'static str,
        len: usize,
        vertex_count: usize,
    },
}

/// Barycentric parameters and distance of a ray/triangle crossing.
///
/// The hit point is `(1 - u - v) * p0 + u * p1 + v * p2`, reached at `origin + t * direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub u: f32,
    pub v: f32,
    pub t: f32,
}

/// A mesh consisting of vertex positions, optional normals and UVs, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Name used in log output
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional, one per vertex)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional, one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with UV coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            name: String::from("mesh"),
            positions,
            normals,
            uvs,
            indices,
            bounds,
        }
    }

    /// Set the name reported in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Recompute `bounds` after positions were edited in place.
    pub fn update_bounds(&mut self) {
        self.bounds = Self::compute_bounds(&self.positions);
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::empty();
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::from_points(min, max)
    }

    /// Check buffer consistency.
    ///
    /// Every index must name an existing vertex and optional attribute
    /// buffers must carry exactly one entry per vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(self.indices.len()));
        }

        let vertex_count = self.positions.len();
        if let Some(position) = self.indices.iter().position(|&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                triangle: position / 3,
                index: self.indices[position],
                vertex_count,
            });
        }

        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(MeshError::AttributeLength {
                    attribute: "normal",
                    len: normals.len(),
                    vertex_count,
                });
            }
        }

        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(MeshError::AttributeLength {
                    attribute: "uv",
                    len: uvs.len(),
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Face normals follow counter-clockwise winding, `(p1 - p0) x (p2 - p0)`,
    /// and are area weighted. Vertices touched by no face get `+Y`.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for triangle in 0..self.triangle_count() {
            let [i0, i1, i2] = self.triangle(triangle).map(|i| i as usize);
            let [p0, p1, p2] = self.triangle_vertices(triangle);
            let face_normal = (p1 - p0).cross(p2 - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        log::debug!(
            "Computed {} smooth normals for mesh '{}'",
            normals.len(),
            self.name
        );
        self.normals = Some(normals);
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of a triangle.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        let base = index * 3;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    /// Vertex positions of a triangle.
    #[inline]
    pub fn triangle_vertices(&self, index: usize) -> [Vec3; 3] {
        self.triangle(index).map(|i| self.positions[i as usize])
    }

    /// Bounding box of a single triangle.
    pub fn triangle_bounds(&self, index: usize) -> Aabb {
        let [p0, p1, p2] = self.triangle_vertices(index);
        Aabb::from_points(p0.min(p1).min(p2), p0.max(p1).max(p2))
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the barycentric `(u, v)` and distance `t` when the ray crosses
    /// the triangle within `[ray.min_t(), ray.max_t()]`. Rays parallel to the
    /// triangle plane never hit.
    pub fn ray_intersect(&self, index: usize, ray: &Ray) -> Option<TriangleHit> {
        let [p0, p1, p2] = self.triangle_vertices(index);

        let edge1 = p1 - p0;
        let edge2 = p2 - p0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle (NaN also fails here)
        if !(a.abs() >= PARALLEL_EPSILON) {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - p0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);

        if !(v >= 0.0 && u + v <= 1.0) {
            return None;
        }

        let t = f * edge2.dot(q);

        if !ray.t.contains(t) {
            return None;
        }

        Some(TriangleHit { u, v, t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_bounds_after_edit() {
        let mut mesh = single_triangle();
        mesh.positions[0] = Vec3::new(-3.0, 0.0, 0.0);
        assert!(mesh.bounds.min().x > -3.0);
        mesh.update_bounds();
        assert_eq!(mesh.bounds.min().x, -3.0);
    }

    fn single_triangle() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![0, 1, 2], None)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = single_triangle();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_normals());
        assert!(!mesh.has_uvs());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = single_triangle();
        mesh.compute_normals();

        let normals = mesh.normals.as_ref().unwrap();
        for normal in normals {
            assert!((normal.z - 1.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2], None);

        assert_eq!(mesh.bounds.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_empty_mesh_bounds() {
        let mesh = Mesh::new(Vec::new(), Vec::new(), None);
        assert!(mesh.bounds.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_triangle_bounds() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(9.0, 9.0, 9.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2, 1, 3, 2], None);

        let bounds = mesh.triangle_bounds(0);
        assert_eq!(bounds.min(), Vec3::ZERO);
        assert_eq!(bounds.max(), Vec3::new(2.0, 3.0, 1.0));
        assert_eq!(mesh.triangle_bounds(1).max(), Vec3::splat(9.0));
    }

    #[test]
    fn test_validate_errors() {
        let mut mesh = single_triangle();
        mesh.indices.push(0);
        assert_eq!(mesh.validate(), Err(MeshError::RaggedIndices(4)));

        let mut mesh = single_triangle();
        mesh.indices[2] = 7;
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { triangle: 0, index: 7, vertex_count: 3 })
        ));

        let mut mesh = single_triangle();
        mesh.uvs = Some(vec![Vec2::ZERO]);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::AttributeLength { attribute: "uv", .. })
        ));
    }

    #[test]
    fn test_ray_intersect_hit() {
        let mesh = single_triangle();
        let ray = Ray::new(Vec3::new(0.25, 0.25, 2.0), -Vec3::Z);

        let hit = mesh.ray_intersect(0, &ray).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-6);
        assert!((hit.u - 0.25).abs() < 1e-6);
        assert!((hit.v - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_ray_intersect_respects_range() {
        let mesh = single_triangle();
        let ray = Ray::with_range(Vec3::new(0.25, 0.25, 2.0), -Vec3::Z, 0.0, 1.5);
        assert!(mesh.ray_intersect(0, &ray).is_none());

        let behind = Ray::new(Vec3::new(0.25, 0.25, 2.0), Vec3::Z);
        assert!(mesh.ray_intersect(0, &behind).is_none());
    }

    #[test]
    fn test_ray_intersect_miss_and_degenerate() {
        let mesh = single_triangle();

        let outside = Ray::new(Vec3::new(0.9, 0.9, 2.0), -Vec3::Z);
        assert!(mesh.ray_intersect(0, &outside).is_none());

        let parallel = Ray::new(Vec3::new(-1.0, 0.25, 0.0), Vec3::X);
        assert!(mesh.ray_intersect(0, &parallel).is_none());

        let zero = Ray::new(Vec3::new(0.25, 0.25, 2.0), Vec3::ZERO);
        assert!(mesh.ray_intersect(0, &zero).is_none());

        let nan = Ray::new(Vec3::new(0.25, 0.25, 2.0), Vec3::new(0.0, f32::NAN, -1.0));
        assert!(mesh.ray_intersect(0, &nan).is_none());
    }
}
