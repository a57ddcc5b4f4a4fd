use crate::{Interval, Ray, Vec3};

/// Corner-direction vectors selecting the 8 octants of a box.
///
/// Octant `i` keeps the half of each axis where `OCTANT_CORNERS[i]` is 0 on the
/// upper side and 1 on the lower side. The order is fixed; traversal visits
/// children in this order.
pub const OCTANT_CORNERS: [Vec3; 8] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
];

/// Axis-Aligned Bounding Box.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Create an AABB from its min and max corners, without padding.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            x: Interval::new(min.x, max.x),
            y: Interval::new(min.y, max.y),
            z: Interval::new(min.z, max.z),
        }
    }

    /// Create an AABB from two corner points.
    ///
    /// Axes thinner than `1e-4` are padded so flat geometry still has volume.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self::from_min_max(a.min(b), a.max(b));
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Size of the box along each axis.
    pub fn extents(&self) -> Vec3 {
        self.max() - self.min()
    }

    /// True if any axis is empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Overlap test. `strict` excludes boxes that merely touch.
    pub fn overlaps(&self, other: &Aabb, strict: bool) -> bool {
        self.x.overlaps(&other.x, strict)
            && self.y.overlaps(&other.y, strict)
            && self.z.overlaps(&other.z, strict)
    }

    /// Point containment. `strict` excludes points on the boundary.
    pub fn contains_point(&self, p: Vec3, strict: bool) -> bool {
        if strict {
            self.x.surrounds(p.x) && self.y.surrounds(p.y) && self.z.surrounds(p.z)
        } else {
            self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
        }
    }

    /// The `index`-th octant (0..8) obtained by halving each axis.
    ///
    /// The max corner is `max - (extents / 2) * OCTANT_CORNERS[index]`, and the
    /// min corner sits half an extent below it. No padding is applied, so the
    /// eight octants tile this box exactly.
    pub fn octant(&self, index: usize) -> Aabb {
        let half = self.extents() * 0.5;
        let max = self.max() - half * OCTANT_CORNERS[index];
        Aabb::from_min_max(max - half, max)
    }

    /// Distances at which the ray enters and leaves the box, clipped to the
    /// ray's current `[min_t, max_t]`.
    ///
    /// Slab method. An axis with a zero direction component is handled by
    /// checking the origin against that slab. NaN anywhere makes the test fail.
    pub fn ray_interval(&self, ray: &Ray) -> Option<Interval> {
        if ray.t.is_empty() {
            return None;
        }

        let origin = ray.origin();
        let direction = ray.direction();
        let inv_direction = ray.inv_direction();
        let mut near = ray.min_t();
        let mut far = ray.max_t();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            if direction[axis] == 0.0 {
                if !slab.contains(origin[axis]) {
                    return None;
                }
                continue;
            }

            let mut t0 = (slab.min - origin[axis]) * inv_direction[axis];
            let mut t1 = (slab.max - origin[axis]) * inv_direction[axis];
            if t0.is_nan() || t1.is_nan() {
                return None;
            }
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            near = near.max(t0);
            far = far.min(t1);
            if near > far {
                return None;
            }
        }

        Some(Interval::new(near, far))
    }

    /// Test if a ray intersects this AABB within the ray's valid range.
    #[inline]
    pub fn hit(&self, ray: &Ray) -> bool {
        self.ray_interval(ray).is_some()
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// A box containing nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_min_max(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_aabb_from_points_pads_flat_axes() {
        let aabb = Aabb::from_points(Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO);

        assert_eq!(aabb.x, Interval::new(0.0, 1.0));
        assert_eq!(aabb.y, Interval::new(0.0, 1.0));
        assert!(aabb.z.size() > 0.0);
        assert!(aabb.z.contains(0.0));
    }

    #[test]
    fn test_aabb_surrounding_empty() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));

        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
        let both = Aabb::surrounding(&box1, &box2);
        assert_eq!(both.min(), Vec3::ZERO);
        assert_eq!(both.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_overlaps_strict_and_inclusive() {
        let a = unit_box();
        let touching = Aabb::from_min_max(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let apart = Aabb::from_min_max(Vec3::splat(2.0), Vec3::splat(3.0));

        assert!(a.overlaps(&touching, false));
        assert!(!a.overlaps(&touching, true));
        assert!(!a.overlaps(&apart, false));
        assert!(a.overlaps(&a, true));
    }

    #[test]
    fn test_aabb_contains() {
        let a = unit_box();
        assert!(a.contains_point(Vec3::splat(0.5), true));
        assert!(a.contains_point(Vec3::ONE, false));
        assert!(!a.contains_point(Vec3::ONE, true));
        assert!(a.contains_point(a.octant(3).min(), false));
    }

    #[test]
    fn test_octants_tile_parent() {
        let parent = Aabb::from_min_max(Vec3::new(-2.0, 0.0, 4.0), Vec3::new(2.0, 1.0, 8.0));
        let half = parent.extents() * 0.5;

        let mut union = Aabb::EMPTY;
        for i in 0..8 {
            let child = parent.octant(i);
            assert!((child.extents() - half).abs().max_element() < 1e-6);
            assert!(parent.contains_point(child.min(), false));
            assert!(parent.contains_point(child.max(), false));
            union = Aabb::surrounding(&union, &child);
        }
        assert_eq!(union, parent);

        // Octant 0 is the upper corner, octant 7 the lower one.
        assert_eq!(parent.octant(0).max(), parent.max());
        assert_eq!(parent.octant(7).min(), parent.min());
    }

    #[test]
    fn test_octants_are_distinct() {
        let parent = unit_box();
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_ne!(parent.octant(i).min(), parent.octant(j).min());
            }
        }
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE);

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&ray));
        let span = aabb.ray_interval(&ray).unwrap();
        assert_eq!(span, Interval::new(4.0, 6.0));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!aabb.hit(&ray));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!aabb.hit(&ray));
    }

    #[test]
    fn test_aabb_hit_respects_max_t() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::ONE);
        let ray = Ray::with_range(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0, 3.5);
        assert!(!aabb.hit(&ray));
    }

    #[test]
    fn test_aabb_hit_flat_box() {
        // Zero thickness along z, ray travelling straight down z.
        let flat = Aabb::from_min_max(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z);
        let span = flat.ray_interval(&ray).unwrap();
        assert_eq!(span.min, 5.0);
        assert_eq!(span.max, 5.0);
    }

    #[test]
    fn test_aabb_hit_degenerate_rays() {
        let aabb = unit_box();

        let zero = Ray::new(Vec3::splat(-1.0), Vec3::ZERO);
        assert!(!aabb.hit(&zero));

        let nan = Ray::new(Vec3::splat(-1.0), Vec3::new(f32::NAN, 1.0, 1.0));
        assert!(!aabb.hit(&nan));

        let nan_origin = Ray::new(Vec3::new(f32::NAN, 0.5, 0.5), Vec3::X);
        assert!(!aabb.hit(&nan_origin));
    }
}
