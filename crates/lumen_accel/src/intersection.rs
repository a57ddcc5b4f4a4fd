//! Intersection records.
//!
//! Traversal only remembers which triangle won and its barycentric
//! coordinates. Everything a shading integrator needs is derived here, once,
//! for the final hit.

use lumen_core::Mesh;
use lumen_math::{Frame, Vec2, Vec3};

use crate::node::MeshId;
use crate::traverse::LeafHit;

/// Full description of the closest surface point hit by a ray.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    /// Distance along the ray
    pub t: f32,
    /// World-space position, interpolated from the triangle's vertices
    pub p: Vec3,
    /// Texture coordinates, or raw barycentric `(u, v)` if the mesh has none
    pub uv: Vec2,
    /// Barycentric weights of the three vertices
    pub barycentric: Vec3,
    /// Frame around the face normal
    pub geo_frame: Frame,
    /// Frame around the interpolated vertex normal, or `geo_frame`
    pub sh_frame: Frame,
    /// Mesh that was hit
    pub mesh: &'a Mesh,
    pub mesh_id: MeshId,
    pub triangle: u32,
}

impl<'a> Intersection<'a> {
    /// Expand a leaf hit on `mesh` into a full record.
    pub fn from_leaf_hit(mesh: &'a Mesh, hit: &LeafHit) -> Self {
        let barycentric = Vec3::new(1.0 - hit.u - hit.v, hit.u, hit.v);
        let [i0, i1, i2] = mesh.triangle(hit.triangle as usize).map(|i| i as usize);
        let [p0, p1, p2] = mesh.triangle_vertices(hit.triangle as usize);

        // Recomputed from barycentrics; more accurate than origin + t * direction.
        let p = blend(barycentric, p0, p1, p2);

        let uv = match &mesh.uvs {
            Some(uvs) => {
                barycentric.x * uvs[i0] + barycentric.y * uvs[i1] + barycentric.z * uvs[i2]
            }
            None => Vec2::new(hit.u, hit.v),
        };

        let geo_frame = Frame::from_normal((p1 - p0).cross(p2 - p0).normalize());

        let sh_frame = match &mesh.normals {
            Some(normals) => {
                let n = blend(barycentric, normals[i0], normals[i1], normals[i2]);
                n.try_normalize().map(Frame::from_normal).unwrap_or(geo_frame)
            }
            None => geo_frame,
        };

        Self {
            t: hit.t,
            p,
            uv,
            barycentric,
            geo_frame,
            sh_frame,
            mesh,
            mesh_id: hit.mesh,
            triangle: hit.triangle,
        }
    }

    /// Convert a world-space direction into the shading frame.
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        self.sh_frame.to_local(v)
    }

    /// Convert a shading-frame direction back into world space.
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.sh_frame.to_world(v)
    }
}

#[inline]
fn blend(weights: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    weights.x * a + weights.y * b + weights.z * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
            ],
            vec![0, 1, 2],
            None,
        )
    }

    fn leaf_hit(u: f32, v: f32) -> LeafHit {
        LeafHit {
            mesh: MeshId(0),
            triangle: 0,
            u,
            v,
            t: 3.0,
        }
    }

    #[test]
    fn test_position_from_barycentrics() {
        let mesh = triangle_mesh();
        let its = Intersection::from_leaf_hit(&mesh, &leaf_hit(0.25, 0.5));

        assert!((its.p - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-6);
        assert!((its.barycentric.x - 0.25).abs() < 1e-6);
        assert_eq!(its.t, 3.0);
        assert_eq!(its.mesh_id, MeshId(0));
        assert!(std::ptr::eq(its.mesh, &mesh));
    }

    #[test]
    fn test_uv_falls_back_to_barycentrics() {
        let mesh = triangle_mesh();
        let its = Intersection::from_leaf_hit(&mesh, &leaf_hit(0.25, 0.5));
        assert_eq!(its.uv, Vec2::new(0.25, 0.5));
    }

    #[test]
    fn test_uv_interpolated_when_present() {
        let mut mesh = triangle_mesh();
        mesh.uvs = Some(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 4.0),
        ]);
        let its = Intersection::from_leaf_hit(&mesh, &leaf_hit(0.5, 0.25));
        assert!((its.uv - Vec2::new(0.5, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_shading_frame_defaults_to_geometric() {
        let mesh = triangle_mesh();
        let its = Intersection::from_leaf_hit(&mesh, &leaf_hit(0.2, 0.2));

        assert!((its.geo_frame.n - Vec3::Z).length() < 1e-6);
        assert_eq!(its.sh_frame, its.geo_frame);
    }

    #[test]
    fn test_shading_frame_from_vertex_normals() {
        let mut mesh = triangle_mesh();
        mesh.normals = Some(vec![
            Vec3::Z,
            Vec3::new(1.0, 0.0, 1.0).normalize(),
            Vec3::Z,
        ]);
        let its = Intersection::from_leaf_hit(&mesh, &leaf_hit(1.0, 0.0));

        assert!((its.sh_frame.n - Vec3::new(1.0, 0.0, 1.0).normalize()).length() < 1e-5);
        assert!((its.geo_frame.n - Vec3::Z).length() < 1e-6);

        let local = its.to_local(its.sh_frame.n);
        assert!((local - Vec3::Z).length() < 1e-5);
        assert!((its.to_world(local) - its.sh_frame.n).length() < 1e-5);
    }
}
