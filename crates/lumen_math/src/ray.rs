use crate::{Interval, Vec3};

/// Default lower bound on hit distance, keeps secondary rays off their origin surface.
pub const RAY_EPSILON: f32 = 1e-4;

/// A ray with origin, direction, and a valid distance range.
///
/// The reciprocal direction is cached for slab tests, so the direction is
/// only settable through the constructor. The range upper bound is the one
/// piece of state that changes during a query: closest-hit traversal narrows
/// it each time a nearer surface is found.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
    /// Valid hit distances, `[min_t, max_t]`
    pub t: Interval,
}

impl Ray {
    /// Create a ray covering `[RAY_EPSILON, +inf)`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_range(origin, direction, RAY_EPSILON, f32::INFINITY)
    }

    /// Create a ray with an explicit distance range.
    pub fn with_range(origin: Vec3, direction: Vec3, min_t: f32, max_t: f32) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
            t: Interval::new(min_t, max_t),
        }
    }

    /// Ray from `from` towards `to`, stopping just short of `to`.
    ///
    /// Distances are measured in units of `to - from`, so the range is `[eps, 1 - eps]`.
    pub fn segment(from: Vec3, to: Vec3) -> Self {
        Self::with_range(from, to - from, RAY_EPSILON, 1.0 - RAY_EPSILON)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Component-wise `1 / direction`. Zero components map to infinities.
    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    #[inline]
    pub fn min_t(&self) -> f32 {
        self.t.min
    }

    #[inline]
    pub fn max_t(&self) -> f32 {
        self.t.max
    }

    /// Lower the upper bound to `t`. Never widens the range.
    #[inline]
    pub fn tighten(&mut self, t: f32) {
        if t < self.t.max {
            self.t.max = t;
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_defaults() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);

        assert_eq!(ray.origin(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(ray.direction(), Vec3::Y);
        assert_eq!(ray.min_t(), RAY_EPSILON);
        assert_eq!(ray.max_t(), f32::INFINITY);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_inv_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, -4.0));
        let inv = ray.inv_direction();

        assert_eq!(inv.x, 0.5);
        assert_eq!(inv.y, f32::INFINITY);
        assert_eq!(inv.z, -0.25);
    }

    #[test]
    fn test_ray_tighten_is_monotonic() {
        let mut ray = Ray::new(Vec3::ZERO, Vec3::Z);

        ray.tighten(10.0);
        assert_eq!(ray.max_t(), 10.0);
        ray.tighten(20.0);
        assert_eq!(ray.max_t(), 10.0);
        ray.tighten(3.0);
        assert_eq!(ray.max_t(), 3.0);
    }

    #[test]
    fn test_ray_segment() {
        let ray = Ray::segment(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));

        assert_eq!(ray.direction(), Vec3::new(0.0, 0.0, 4.0));
        assert!(ray.max_t() < 1.0);
        assert!(ray.at(ray.max_t()).z < 4.0);
    }
}
