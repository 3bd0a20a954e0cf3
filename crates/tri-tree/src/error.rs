//! Error types for tree construction.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur while supplying triangles or building a tree.
///
/// Queries never fail; a query against an empty tree simply finds nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A build setting is outside its usable range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A triangle names a vertex the vertex buffer does not contain.
    #[error("vertex index {index} out of range for vertex buffer of length {len}")]
    VertexOutOfRange {
        /// The offending vertex index.
        index: u32,
        /// Number of vertices in the buffer.
        len: usize,
    },

    /// More triangles than a 32-bit triangle index can address.
    #[error("too many triangles: {0}")]
    TooManyTriangles(usize),

    /// The node arena could not grow. The partially built tree is discarded.
    #[error("out of memory while building tree: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
