//! Octree nodes.
//!
//! The tree is a plain owned enum: internal nodes own up to eight boxed
//! children and leaves own per-mesh triangle index lists. It is never mutated
//! after the build.

use std::fmt;
use std::time::Duration;

use lumen_math::Aabb;

/// Registration index of a mesh inside an [`Accel`](crate::Accel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// A triangle identified by its mesh and its index within that mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveRef {
    pub mesh: MeshId,
    pub triangle: u32,
}

/// Octree node - either an internal node with eight octant slots or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Internal node. A `None` slot is an octant no triangle overlaps.
    Internal {
        bbox: Aabb,
        children: [Option<Box<Node>>; 8],
    },
    /// Leaf node. `triangles[m]` lists the triangles of mesh `m` overlapping `bbox`.
    Leaf {
        bbox: Aabb,
        triangles: Vec<Vec<u32>>,
    },
}

impl Node {
    /// The region this node was built for.
    pub fn bbox(&self) -> &Aabb {
        match self {
            Node::Internal { bbox, .. } => bbox,
            Node::Leaf { bbox, .. } => bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Present children in octant order. Empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        let slots: &[Option<Box<Node>>] = match self {
            Node::Internal { children, .. } => children,
            Node::Leaf { .. } => &[],
        };
        slots.iter().flatten().map(|child| &**child)
    }

    /// Triangles stored directly in this node. Empty for internal nodes.
    pub fn primitives(&self) -> impl Iterator<Item = PrimitiveRef> + '_ {
        let lists: &[Vec<u32>] = match self {
            Node::Internal { .. } => &[],
            Node::Leaf { triangles, .. } => triangles,
        };
        lists.iter().enumerate().flat_map(|(mesh, triangles)| {
            triangles.iter().map(move |&triangle| PrimitiveRef {
                mesh: MeshId(mesh),
                triangle,
            })
        })
    }

    /// Number of triangle references held by a leaf (0 for internal nodes).
    pub fn primitive_count(&self) -> usize {
        match self {
            Node::Internal { .. } => 0,
            Node::Leaf { triangles, .. } => triangles.iter().map(Vec::len).sum(),
        }
    }

    /// Walk the subtree and summarize its shape.
    ///
    /// `leaf_threshold` is only used to count leaves the depth cap forced
    /// to hold more triangles than a normal leaf.
    pub fn stats(&self, leaf_threshold: usize) -> OctreeStats {
        let mut stats = OctreeStats::default();
        self.accumulate_stats(0, leaf_threshold, &mut stats);
        stats
    }

    fn accumulate_stats(&self, depth: u32, leaf_threshold: usize, stats: &mut OctreeStats) {
        stats.max_depth = stats.max_depth.max(depth);
        match self {
            Node::Internal { .. } => {
                stats.internal_nodes += 1;
                for child in self.children() {
                    child.accumulate_stats(depth + 1, leaf_threshold, stats);
                }
            }
            Node::Leaf { .. } => {
                let count = self.primitive_count();
                stats.leaves += 1;
                stats.triangle_refs += count;
                stats.max_leaf_triangles = stats.max_leaf_triangles.max(count);
                if count > leaf_threshold {
                    stats.oversized_leaves += 1;
                }
            }
        }
    }
}

/// Shape summary of a built octree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OctreeStats {
    /// Triangles registered across all meshes
    pub triangles: usize,
    pub internal_nodes: usize,
    pub leaves: usize,
    /// Depth of the deepest node (root is 0)
    pub max_depth: u32,
    /// Triangle references over all leaves; exceeds `triangles` when triangles straddle octants
    pub triangle_refs: usize,
    pub max_leaf_triangles: usize,
    /// Leaves the depth cap forced to exceed the leaf threshold
    pub oversized_leaves: usize,
    pub build_time: Duration,
}

impl OctreeStats {
    pub fn node_count(&self) -> usize {
        self.internal_nodes + self.leaves
    }

    /// Average number of leaves each triangle landed in.
    pub fn duplication_factor(&self) -> f32 {
        if self.triangles == 0 {
            0.0
        } else {
            self.triangle_refs as f32 / self.triangles as f32
        }
    }
}
