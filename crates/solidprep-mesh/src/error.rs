//! Error types for mesh construction.

use thiserror::Error;

/// Result type for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// Structural errors detected when building a [`crate::Mesh`].
///
/// These are fail-fast errors: a `Mesh` value that exists is guaranteed
/// to be structurally sound, so downstream queries never have to
/// re-check index bounds.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A triangle references a vertex index outside the vertex array.
    #[error("triangle {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    IndexOutOfBounds {
        /// Index of the offending triangle.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },
}
