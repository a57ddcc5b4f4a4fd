//! Lumen acceleration structure.
//!
//! An octree over one or more triangle meshes answering two kinds of ray
//! queries: shadow queries (is anything in the way?) and closest-hit queries
//! returning a full [`Intersection`] with position, texture coordinates and
//! shading frames.
//!
//! The usual lifecycle is register, build once, then query from any number of
//! threads:
//!
//! ```
//! use std::sync::Arc;
//! use lumen_accel::{Accel, AccelConfig};
//! use lumen_core::shapes;
//! use lumen_math::{Ray, Vec3};
//!
//! let mut accel = Accel::with_config(AccelConfig::default())?;
//! let floor = accel.add_mesh(Arc::new(shapes::grid(Vec3::ZERO, Vec3::X, Vec3::Y, 8)))?;
//! accel.build()?;
//!
//! let ray = Ray::new(Vec3::new(0.33, 0.71, 2.0), -Vec3::Z);
//! assert!(accel.is_occluded(&ray));
//! assert_eq!(accel.intersect(&ray).map(|its| its.mesh_id), Some(floor));
//! # Ok::<(), lumen_accel::AccelError>(())
//! ```

pub mod accel;
mod build;
pub mod config;
pub mod error;
pub mod intersection;
pub mod node;
pub mod traverse;

pub use accel::Accel;
pub use config::AccelConfig;
pub use error::{AccelError, AccelResult};
pub use intersection::Intersection;
pub use node::{MeshId, Node, OctreeStats, PrimitiveRef};
pub use traverse::{LeafHit, TraversalStats};
