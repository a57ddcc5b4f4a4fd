//! Errors raised while configuring or building the index.
//!
//! Queries never fail; only the registration and build boundary does.

use lumen_core::MeshError;
use thiserror::Error;

/// Errors that can occur while setting up an [`Accel`](crate::Accel).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccelError {
    #[error("acceleration structure is already built; meshes must be added before build()")]
    AlreadyBuilt,

    #[error("invalid mesh '{name}': {source}")]
    InvalidMesh {
        name: String,
        #[source]
        source: MeshError,
    },

    #[error("mesh '{name}' has {count} triangles; at most {} are supported", u32::MAX)]
    TooManyTriangles { name: String, count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for index setup.
pub type AccelResult<T> = Result<T, AccelError>;
