// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod frame;
mod interval;
mod ray;

pub use aabb::{Aabb, OCTANT_CORNERS};
pub use frame::Frame;
pub use interval::Interval;
pub use ray::{Ray, RAY_EPSILON};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octant_of_ray_target() {
        let scene = Aabb::from_min_max(Vec3::ZERO, Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.5, 0.5, 10.0), -Vec3::Z);

        let hit: Vec<usize> = (0..8).filter(|&i| scene.octant(i).hit(&ray)).collect();
        assert_eq!(hit.len(), 2);
    }
}
