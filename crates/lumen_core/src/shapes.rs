//! Procedural meshes for tests, probes and quick scenes.

use lumen_math::{Vec2, Vec3};

use crate::mesh::Mesh;

/// Two-triangle quad through `a, b, c, d` (counter-clockwise).
///
/// UVs run `a(0,0) b(1,0) c(1,1) d(0,1)`.
pub fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Mesh {
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    Mesh::new_with_uvs(vec![a, b, c, d], vec![0, 1, 2, 0, 2, 3], None, Some(uvs)).with_name("quad")
}

/// Planar grid of `resolution x resolution` cells spanning `origin + s * u_axis + t * v_axis`
/// for `s, t` in `[0, 1]`. Produces `2 * resolution^2` triangles with UVs and flat normals.
pub fn grid(origin: Vec3, u_axis: Vec3, v_axis: Vec3, resolution: u32) -> Mesh {
    let resolution = resolution.max(1);
    let side = resolution + 1;
    let normal = u_axis.cross(v_axis).normalize_or_zero();

    let mut positions = Vec::with_capacity((side * side) as usize);
    let mut uvs = Vec::with_capacity((side * side) as usize);
    for j in 0..side {
        for i in 0..side {
            let s = i as f32 / resolution as f32;
            let t = j as f32 / resolution as f32;
            positions.push(origin + u_axis * s + v_axis * t);
            uvs.push(Vec2::new(s, t));
        }
    }

    let mut indices = Vec::with_capacity((resolution * resolution * 6) as usize);
    for j in 0..resolution {
        for i in 0..resolution {
            let i0 = j * side + i;
            let i1 = i0 + 1;
            let i2 = i0 + side + 1;
            let i3 = i0 + side;
            indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
        }
    }

    let normals = vec![normal; positions.len()];
    Mesh::new_with_uvs(positions, indices, Some(normals), Some(uvs)).with_name("grid")
}

/// Closed axis-aligned box with outward-facing triangles (12 triangles, no attributes).
pub fn cuboid(min: Vec3, max: Vec3) -> Mesh {
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };

    let positions = vec![
        corner(false, false, false),
        corner(true, false, false),
        corner(true, true, false),
        corner(false, true, false),
        corner(false, false, true),
        corner(true, false, true),
        corner(true, true, true),
        corner(false, true, true),
    ];

    #[rustfmt::skip]
    let indices = vec![
        0, 3, 2, 0, 2, 1, // -z
        4, 5, 6, 4, 6, 7, // +z
        0, 1, 5, 0, 5, 4, // -y
        3, 7, 6, 3, 6, 2, // +y
        0, 4, 7, 0, 7, 3, // -x
        1, 2, 6, 1, 6, 5, // +x
    ];

    Mesh::new(positions, indices, None).with_name("cuboid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad() {
        let mesh = quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.validate().is_ok());
        assert!(mesh.has_uvs());
    }

    #[test]
    fn test_grid_counts() {
        let mesh = grid(Vec3::ZERO, Vec3::X, Vec3::Y, 10);
        assert_eq!(mesh.triangle_count(), 200);
        assert_eq!(mesh.vertex_count(), 121);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.normals.as_ref().unwrap()[0], Vec3::Z);
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mesh = cuboid(Vec3::ZERO, Vec3::ONE);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.validate().is_ok());

        let center = Vec3::splat(0.5);
        for tri in 0..mesh.triangle_count() {
            let [p0, p1, p2] = mesh.triangle_vertices(tri);
            let normal = (p1 - p0).cross(p2 - p0);
            let outward = (p0 + p1 + p2) / 3.0 - center;
            assert!(normal.dot(outward) > 0.0, "triangle {tri} faces inward");
        }
    }
}
