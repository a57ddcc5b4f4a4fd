//! The acceleration structure facade.
//!
//! Meshes are registered first, then [`Accel::build`] freezes them into an
//! octree. Every query after that takes `&self`, so a built `Accel` can be
//! shared across render threads as-is.

use std::sync::Arc;
use std::time::Instant;

use lumen_core::Mesh;
use lumen_math::{Aabb, Ray};

use crate::build::OctreeBuilder;
use crate::config::AccelConfig;
use crate::error::{AccelError, AccelResult};
use crate::intersection::Intersection;
use crate::node::{MeshId, Node, OctreeStats};
use crate::traverse::{Query, QueryOutcome, TraversalStats};

/// Octree acceleration structure over one or more triangle meshes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lumen_accel::Accel;
/// use lumen_core::shapes;
/// use lumen_math::{Ray, Vec3};
///
/// let mut accel = Accel::new();
/// accel.add_mesh(Arc::new(shapes::cuboid(Vec3::ZERO, Vec3::ONE)))?;
/// accel.build()?;
///
/// let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), -Vec3::Z);
/// let its = accel.intersect(&ray).expect("ray hits the top face");
/// assert!((its.t - 4.0).abs() < 1e-4);
/// # Ok::<(), lumen_accel::AccelError>(())
/// ```
#[derive(Debug)]
pub struct Accel {
    config: AccelConfig,
    meshes: Vec<Arc<Mesh>>,
    /// Union of the registered meshes' bounds
    bbox: Aabb,
    root: Option<Node>,
    stats: Option<OctreeStats>,
}

impl Accel {
    /// Create an empty index with the default configuration.
    pub fn new() -> Self {
        Self {
            config: AccelConfig::default(),
            meshes: Vec::new(),
            bbox: Aabb::EMPTY,
            root: None,
            stats: None,
        }
    }

    /// Create an empty index with a custom configuration.
    pub fn with_config(config: AccelConfig) -> AccelResult<Self> {
        config.validate()?;
        log::debug!("Accel config: {:?}", config);
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Register a mesh. Only allowed before [`build`](Self::build).
    ///
    /// The mesh is validated and its bounds are folded into the scene bounds.
    pub fn add_mesh(&mut self, mesh: Arc<Mesh>) -> AccelResult<MeshId> {
        if self.is_built() {
            log::error!("Rejected mesh '{}': index already built", mesh.name);
            return Err(AccelError::AlreadyBuilt);
        }

        mesh.validate().map_err(|source| AccelError::InvalidMesh {
            name: mesh.name.clone(),
            source,
        })?;

        check_triangle_count(&mesh.name, mesh.triangle_count())?;

        if mesh.triangle_count() == 0 {
            log::warn!("Mesh '{}' has no triangles", mesh.name);
        }

        let id = MeshId(self.meshes.len());
        log::debug!(
            "Registered {} '{}': {} triangles, {} vertices",
            id,
            mesh.name,
            mesh.triangle_count(),
            mesh.vertex_count()
        );

        self.bbox = Aabb::surrounding(&self.bbox, &mesh.bounds);
        self.meshes.push(mesh);
        Ok(id)
    }

    /// Build the octree over every registered mesh. Call exactly once.
    ///
    /// A scene without triangles builds successfully; every query on it
    /// reports no hit.
    pub fn build(&mut self) -> AccelResult<OctreeStats> {
        if self.is_built() {
            return Err(AccelError::AlreadyBuilt);
        }

        let start = Instant::now();
        let root = OctreeBuilder::new(&self.meshes, &self.config).build_root(self.bbox);

        let mut stats = root
            .as_ref()
            .map(|root| root.stats(self.config.leaf_threshold))
            .unwrap_or_default();
        stats.triangles = self.triangle_count();
        stats.build_time = start.elapsed();

        if root.is_none() {
            log::warn!("Octree built over an empty scene; all queries will miss");
        } else {
            log::info!(
                "Octree built in {:.2?}: {} meshes, {} triangles, {} internal nodes, {} leaves, depth {}, {:.2} refs/triangle",
                stats.build_time,
                self.meshes.len(),
                stats.triangles,
                stats.internal_nodes,
                stats.leaves,
                stats.max_depth,
                stats.duplication_factor()
            );
        }

        if stats.oversized_leaves > 0 {
            log::warn!(
                "{} leaves hit the depth cap ({}) above the leaf threshold; largest holds {} triangles",
                stats.oversized_leaves,
                self.config.max_depth,
                stats.max_leaf_triangles
            );
        }

        self.root = root;
        self.stats = Some(stats);
        Ok(stats)
    }

    pub fn is_built(&self) -> bool {
        self.stats.is_some()
    }

    /// Bounding box of the whole scene.
    pub fn bounding_box(&self) -> &Aabb {
        &self.bbox
    }

    pub fn config(&self) -> &AccelConfig {
        &self.config
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Arc<Mesh>> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[Arc<Mesh>] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total triangles over all registered meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.triangle_count()).sum()
    }

    /// Root of the built tree. `None` before the build or for an empty scene.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Statistics from the build, once built.
    pub fn stats(&self) -> Option<&OctreeStats> {
        self.stats.as_ref()
    }

    /// Intersect a ray with the scene.
    ///
    /// With `shadow_ray` the search stops at the first blocker and only the
    /// boolean is meaningful; the record is always `None`. Otherwise the
    /// closest intersection within the ray's range is returned.
    pub fn ray_intersect(&self, ray: &Ray, shadow_ray: bool) -> (bool, Option<Intersection<'_>>) {
        let (found, its, _) = self.finish(Query::new(&self.meshes, ray), shadow_ray);
        (found, its)
    }

    /// Closest intersection along the ray, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.ray_intersect(ray, false).1
    }

    /// True if anything blocks the ray within its range.
    pub fn is_occluded(&self, ray: &Ray) -> bool {
        self.ray_intersect(ray, true).0
    }

    /// Like [`ray_intersect`](Self::ray_intersect), also returning traversal
    /// counters including per-mesh triangle test counts.
    pub fn trace(
        &self,
        ray: &Ray,
        shadow_ray: bool,
    ) -> (bool, Option<Intersection<'_>>, TraversalStats) {
        self.finish(Query::with_stats(&self.meshes, ray), shadow_ray)
    }

    fn finish(
        &self,
        query: Query<'_>,
        shadow_ray: bool,
    ) -> (bool, Option<Intersection<'_>>, TraversalStats) {
        let QueryOutcome { found, hit, stats } = query.run(self.root.as_ref(), shadow_ray);

        let its = hit.map(|hit| Intersection::from_leaf_hit(&self.meshes[hit.mesh.0], &hit));
        (found, its, stats)
    }
}

/// Triangle indices are stored as `u32` in the tree.
fn check_triangle_count(name: &str, count: usize) -> AccelResult<u32> {
    u32::try_from(count).map_err(|_| AccelError::TooManyTriangles {
        name: name.to_string(),
        count,
    })
}

impl Default for Accel {
    fn default() -> Self {
        Self::new()
    }
}
