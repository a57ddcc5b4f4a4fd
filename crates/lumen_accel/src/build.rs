//! Octree construction.
//!
//! Recursive subdivision into octants. A triangle is assigned to every octant
//! its bounding box overlaps (boundaries inclusive), so triangles straddling a
//! split plane are stored more than once and traversal never misses them.
//! Sibling subtrees share nothing but read access to the triangle bounds, so
//! large nodes fan their eight children out on the rayon pool.

use std::sync::Arc;

use lumen_core::Mesh;
use lumen_math::Aabb;
use rayon::prelude::*;

use crate::config::AccelConfig;
use crate::node::Node;

/// Per-mesh triangle index lists assigned to one region.
pub(crate) type TriangleLists = Vec<Vec<u32>>;

/// Builds an octree over a fixed set of meshes.
pub(crate) struct OctreeBuilder<'a> {
    config: &'a AccelConfig,
    /// `triangle_bounds[m][i]` is the box of triangle `i` of mesh `m`
    triangle_bounds: Vec<Vec<Aabb>>,
}

impl<'a> OctreeBuilder<'a> {
    pub(crate) fn new(meshes: &[Arc<Mesh>], config: &'a AccelConfig) -> Self {
        let mesh_bounds = |mesh: &Arc<Mesh>| -> Vec<Aabb> {
            (0..mesh.triangle_count())
                .map(|i| mesh.triangle_bounds(i))
                .collect()
        };

        let triangle_bounds = if config.parallel_build {
            meshes.par_iter().map(mesh_bounds).collect()
        } else {
            meshes.iter().map(mesh_bounds).collect()
        };

        Self {
            config,
            triangle_bounds,
        }
    }

    /// Build the whole tree over `scene_bbox` with every triangle of every mesh.
    pub(crate) fn build_root(&self, scene_bbox: Aabb) -> Option<Node> {
        let triangles: TriangleLists = self
            .triangle_bounds
            .iter()
            // Accel::add_mesh rejects meshes whose triangle count overflows u32.
            .map(|bounds| (0..bounds.len() as u32).collect())
            .collect();

        self.build(scene_bbox, triangles, 0)
    }

    /// Build the subtree for `bbox` holding `triangles`, at `depth` below the root.
    ///
    /// Returns `None` for an empty region. Small regions and regions at the
    /// depth cap become leaves holding exactly the triangles passed in.
    pub(crate) fn build(&self, bbox: Aabb, triangles: TriangleLists, depth: u32) -> Option<Node> {
        let count: usize = triangles.iter().map(Vec::len).sum();
        if count == 0 {
            return None;
        }

        if count <= self.config.leaf_threshold || depth >= self.config.max_depth {
            return Some(Node::Leaf { bbox, triangles });
        }

        let octants: [Aabb; 8] = std::array::from_fn(|i| bbox.octant(i));
        let lists = self.assign(&octants, &triangles);
        drop(triangles);

        let jobs: Vec<(Aabb, TriangleLists)> = octants.into_iter().zip(lists).collect();
        let build_child = |(child_box, child_triangles): (Aabb, TriangleLists)| {
            self.build(child_box, child_triangles, depth + 1).map(Box::new)
        };

        let built: Vec<Option<Box<Node>>> =
            if self.config.parallel_build && count >= self.config.parallel_min_triangles {
                jobs.into_par_iter().map(build_child).collect()
            } else {
                jobs.into_iter().map(build_child).collect()
            };

        let mut children: [Option<Box<Node>>; 8] = Default::default();
        for (slot, child) in children.iter_mut().zip(built) {
            *slot = child;
        }

        Some(Node::Internal { bbox, children })
    }

    /// Distribute triangles over the octants whose boxes their bounds overlap.
    fn assign(&self, octants: &[Aabb; 8], triangles: &TriangleLists) -> [TriangleLists; 8] {
        let mut lists: [TriangleLists; 8] =
            std::array::from_fn(|_| vec![Vec::new(); triangles.len()]);

        for (mesh, indices) in triangles.iter().enumerate() {
            let bounds = &self.triangle_bounds[mesh];
            for &triangle in indices {
                let triangle_box = &bounds[triangle as usize];
                for (octant, list) in octants.iter().zip(lists.iter_mut()) {
                    if octant.overlaps(triangle_box, false) {
                        list[mesh].push(triangle);
                    }
                }
            }
        }

        lists
    }
}
