//! Triangle bounding-volume hierarchy for ray and range queries.

mod aabb;
mod error;
mod intersect;
mod poly;
mod ray;
mod sphere;
mod tri;
mod vertex;

pub mod tree;

pub use aabb::{Aabb, Axis};
pub use error::{Result, TreeError};
pub use intersect::{
    Hit, IntersectRayOptions, closest_point_on_triangle, ray_triangle, triangle_intersects_box,
    triangle_intersects_sphere,
};
pub use ray::Ray;
pub use sphere::Sphere;
pub use tree::{Settings, SplitAlgorithm, Stats, TriTree};
pub use tri::{ConstantCoverage, Coverage, Tri};
pub use vertex::{Vertex, VertexBuffer};
