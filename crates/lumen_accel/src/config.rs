//! Octree build configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AccelError, AccelResult};

/// Deepest `max_depth` accepted by [`AccelConfig::validate`].
pub const MAX_DEPTH_LIMIT: u32 = 24;

/// Octree build configuration.
///
/// Missing fields fall back to their defaults when deserialized, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelConfig {
    /// Nodes at this depth are always leaves
    pub max_depth: u32,
    /// Regions holding at most this many triangles become leaves
    pub leaf_threshold: usize,
    /// Build the 8 children of a node on the rayon pool
    pub parallel_build: bool,
    /// Nodes with fewer triangles than this build their children sequentially
    pub parallel_min_triangles: usize,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            leaf_threshold: 10,
            parallel_build: true,
            parallel_min_triangles: 1024,
        }
    }
}

impl AccelConfig {
    /// Configuration that builds on the calling thread only.
    pub fn sequential() -> Self {
        Self {
            parallel_build: false,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> AccelResult<()> {
        if self.leaf_threshold == 0 {
            return Err(AccelError::InvalidConfig(
                "leaf_threshold must be at least 1".into(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(AccelError::InvalidConfig(format!(
                "max_depth {} exceeds the limit of {}",
                self.max_depth, MAX_DEPTH_LIMIT
            )));
        }
        Ok(())
    }
}
