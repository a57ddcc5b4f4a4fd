//! Octree traversal.
//!
//! One [`Query`] per ray. The query owns a private copy of the ray whose upper
//! bound shrinks as closer hits are found, plus the best hit so far and a few
//! counters, so concurrent queries against the same tree share nothing
//! mutable.

use std::sync::Arc;

use lumen_core::Mesh;
use lumen_math::Ray;

use crate::node::{MeshId, Node};

/// Raw result of a leaf-level intersection: which triangle, where on it, how far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafHit {
    pub mesh: MeshId,
    pub triangle: u32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
    pub t: f32,
}

/// Work counters collected during one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose box was tested
    pub nodes_visited: usize,
    /// Nodes whose box the ray missed
    pub nodes_pruned: usize,
    /// Ray/triangle tests performed, per mesh. Empty unless the query was
    /// started with [`Query::with_stats`].
    pub triangle_tests: Vec<usize>,
}

impl TraversalStats {
    fn per_mesh(mesh_count: usize) -> Self {
        Self {
            triangle_tests: vec![0; mesh_count],
            ..Default::default()
        }
    }

    #[inline]
    fn count_triangle_test(&mut self, mesh_index: usize) {
        if let Some(count) = self.triangle_tests.get_mut(mesh_index) {
            *count += 1;
        }
    }

    pub fn triangle_tests_for(&self, mesh: MeshId) -> usize {
        self.triangle_tests.get(mesh.0).copied().unwrap_or(0)
    }

    pub fn total_triangle_tests(&self) -> usize {
        self.triangle_tests.iter().sum()
    }
}

/// Outcome of a finished query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub found: bool,
    /// Closest hit. Always `None` for shadow queries.
    pub hit: Option<LeafHit>,
    pub stats: TraversalStats,
}

/// State of a single ray query against an octree.
pub struct Query<'a> {
    meshes: &'a [Arc<Mesh>],
    ray: Ray,
    best: Option<LeafHit>,
    stats: TraversalStats,
}

impl<'a> Query<'a> {
    /// Start a query. The ray is copied; the caller's ray is never modified.
    ///
    /// Only node counters are kept; per-mesh triangle test counts stay empty.
    pub fn new(meshes: &'a [Arc<Mesh>], ray: &Ray) -> Self {
        Self {
            meshes,
            ray: *ray,
            best: None,
            stats: TraversalStats::default(),
        }
    }

    /// Start a query that also counts triangle tests per mesh.
    pub fn with_stats(meshes: &'a [Arc<Mesh>], ray: &Ray) -> Self {
        Self {
            stats: TraversalStats::per_mesh(meshes.len()),
            ..Self::new(meshes, ray)
        }
    }

    /// Run the query from `root`.
    ///
    /// A shadow query stops at the first intersection found and reports no
    /// hit details. Otherwise the closest intersection is returned.
    pub fn run(mut self, root: Option<&Node>, shadow_ray: bool) -> QueryOutcome {
        let found = match root {
            None => false,
            Some(root) if shadow_ray => self.any_hit(root),
            Some(root) => self.closest_hit(root),
        };

        QueryOutcome {
            found,
            hit: if shadow_ray { None } else { self.best },
            stats: self.stats,
        }
    }

    /// Box test for a node, with bookkeeping.
    fn enter(&mut self, node: &Node) -> bool {
        self.stats.nodes_visited += 1;
        if node.bbox().hit(&self.ray) {
            true
        } else {
            self.stats.nodes_pruned += 1;
            false
        }
    }

    /// Any-hit descent. Returns as soon as one triangle is hit.
    fn any_hit(&mut self, node: &Node) -> bool {
        if !self.enter(node) {
            return false;
        }

        match node {
            Node::Internal { children, .. } => children
                .iter()
                .flatten()
                .any(|child| self.any_hit(child)),
            Node::Leaf { triangles, .. } => {
                let meshes = self.meshes;
                for (mesh_index, indices) in triangles.iter().enumerate() {
                    let mesh = &meshes[mesh_index];
                    for &triangle in indices {
                        self.stats.count_triangle_test(mesh_index);
                        if mesh.ray_intersect(triangle as usize, &self.ray).is_some() {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }

    /// Closest-hit descent.
    ///
    /// Children are visited in octant order, all of them, since they are not
    /// sorted by distance. Each accepted hit lowers the ray's upper bound so
    /// later box and triangle tests reject anything farther away. Returns
    /// whether this subtree improved the best hit.
    fn closest_hit(&mut self, node: &Node) -> bool {
        if !self.enter(node) {
            return false;
        }

        match node {
            Node::Internal { children, .. } => {
                let mut found = false;
                for child in children.iter().flatten() {
                    found |= self.closest_hit(child);
                }
                found
            }
            Node::Leaf { triangles, .. } => {
                let meshes = self.meshes;
                let mut found = false;
                for (mesh_index, indices) in triangles.iter().enumerate() {
                    let mesh = &meshes[mesh_index];
                    for &triangle in indices {
                        self.stats.count_triangle_test(mesh_index);
                        let Some(hit) = mesh.ray_intersect(triangle as usize, &self.ray) else {
                            continue;
                        };
                        // Strictly closer only: the first of equal-distance hits wins.
                        if self.best.map_or(true, |best| hit.t < best.t) {
                            self.best = Some(LeafHit {
                                mesh: MeshId(mesh_index),
                                triangle,
                                u: hit.u,
                                v: hit.v,
                                t: hit.t,
                            });
                            self.ray.tighten(hit.t);
                            found = true;
                        }
                    }
                }
                found
            }
        }
    }
}
