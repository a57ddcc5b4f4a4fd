//! Lumen Core - scene geometry consumed by the intersection index.
//!
//! This crate provides:
//!
//! - **Mesh**: triangle buffers with per-triangle bounds and ray intersection
//! - **Shapes**: procedural quads, grids and boxes
//!
//! # Example
//!
//! ```
//! use lumen_core::shapes;
//! use lumen_math::{Ray, Vec3};
//!
//! let floor = shapes::grid(Vec3::ZERO, Vec3::X, Vec3::Y, 4);
//! let ray = Ray::new(Vec3::new(0.3, 0.4, 1.0), -Vec3::Z);
//! let hits = (0..floor.triangle_count())
//!     .filter(|&i| floor.ray_intersect(i, &ray).is_some())
//!     .count();
//! assert_eq!(hits, 1);
//! ```

pub mod mesh;
pub mod shapes;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError, TriangleHit};
