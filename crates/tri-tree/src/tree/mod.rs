//! Bounding-volume hierarchy over triangles.
//!
//! The tree recursively splits the triangle set with axis-aligned planes.
//! Triangles straddling a plane are clipped so that each child receives only
//! the part on its side, except for triangles too large relative to the node,
//! which stay at the node itself. This enables:
//!
//! - Nearest-hit and occlusion ray queries with front-to-back traversal
//! - Batched ray queries across all cores
//! - Sphere and box range queries
//!
//! # Example
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use tri_tree::{IntersectRayOptions, Ray, Settings, SplitAlgorithm, TriTree, VertexBuffer};
//!
//! let vertices = VertexBuffer::from_positions([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(5.0, 0.0, 0.0),
//!     Point3::new(6.0, 0.0, 0.0),
//!     Point3::new(5.0, 1.0, 0.0),
//! ]);
//! let settings = Settings::default()
//!     .with_algorithm(SplitAlgorithm::MedianCount)
//!     .with_values_per_leaf(1);
//! let tree = TriTree::from_mesh(vertices, &[[0, 1, 2], [3, 4, 5]], settings).unwrap();
//!
//! let ray = Ray::new(Point3::new(5.2, 0.2, 3.0), Vector3::new(0.0, 0.0, -1.0));
//! let hit = tree.intersect_ray(&ray, IntersectRayOptions::empty()).unwrap();
//! assert_eq!(hit.tri_index, 1);
//! ```
//!
//! # Architecture
//!
//! - [`TriTree`]: triangle storage, lifecycle and queries
//! - [`Node`]: a node of the hierarchy, addressed by [`NodeId`]
//! - [`Settings`] and [`SplitAlgorithm`]: how the tree is built
//! - [`NodeVisitor`]: visitor trait for walking the nodes

mod arena;
mod build;
mod node;
mod query;
mod settings;
mod split;
mod stats;
mod tri_tree;
mod visitor;

// Re-export main types
pub use node::{Node, NodeId, NodeKind, ValueRange};
pub use settings::{SahParams, Settings, SplitAlgorithm};
pub use stats::Stats;
pub use tri_tree::{MIN_TRI_AREA, TriTree};
pub use visitor::{FnVisitor, NodeVisitor};
