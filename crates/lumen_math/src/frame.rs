//! Orthonormal shading frames.
//!
//! A frame stores two tangents `s`, `t` and a normal `n`. Intersection records
//! carry one frame built from the face normal and one from the interpolated
//! vertex normal.

use crate::Vec3;

/// Right-handed orthonormal basis `(s, t, n)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub s: Vec3,
    pub t: Vec3,
    pub n: Vec3,
}

impl Frame {
    /// Build a frame around a unit normal. The tangents are arbitrary but
    /// continuous in `n`.
    pub fn from_normal(n: Vec3) -> Self {
        let (s, t) = n.any_orthonormal_pair();
        Self { s, t, n }
    }

    /// Express a world-space vector in this frame.
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.s), v.dot(self.t), v.dot(self.n))
    }

    /// Convert a frame-local vector back to world space.
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}
