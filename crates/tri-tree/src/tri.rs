//! Triangle records referencing a shared vertex buffer.

use std::fmt;
use std::sync::Arc;

use nalgebra::{Point3, Vector2, Vector3};

use crate::{Aabb, Result, TreeError, Vertex, VertexBuffer};

/// Partial-coverage ("alpha test") source for a triangle's surface.
///
/// Ray queries evaluate it at the hit's interpolated texture coordinate and
/// discard the hit when coverage falls below the active threshold.
pub trait Coverage: fmt::Debug + Send + Sync {
    /// Returns the fraction of the surface covered at `tex_coord`, in `[0, 1]`.
    fn coverage(&self, tex_coord: Vector2<f32>) -> f32;
}

/// Coverage that is the same everywhere on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantCoverage(pub f32);

impl Coverage for ConstantCoverage {
    fn coverage(&self, _tex_coord: Vector2<f32>) -> f32 {
        self.0
    }
}

/// A triangle given by three indices into a [`VertexBuffer`].
///
/// The winding order determines the front face via the right-hand rule:
/// normal = (b - a) × (c - a).
#[derive(Debug, Clone)]
pub struct Tri {
    indices: [u32; 3],
    two_sided: bool,
    area: f32,
    coverage: Option<Arc<dyn Coverage>>,
}

impl Tri {
    /// Creates a one-sided, fully opaque triangle and precomputes its area.
    ///
    /// Returns [`TreeError::VertexOutOfRange`] if any index is not in `vertices`.
    pub fn new(vertices: &VertexBuffer, indices: [u32; 3]) -> Result<Self> {
        check_indices(vertices, &indices)?;
        let [a, b, c] = indices.map(|i| vertices.position(i));
        let area = (b - a).cross(&(c - a)).norm() * 0.5;
        Ok(Self {
            indices,
            two_sided: false,
            area,
            coverage: None,
        })
    }

    /// Marks the triangle as visible from both sides.
    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    /// Attaches a partial-coverage source.
    pub fn with_coverage(mut self, coverage: Arc<dyn Coverage>) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Returns the three vertex indices.
    #[inline]
    pub fn indices(&self) -> [u32; 3] {
        self.indices
    }

    /// Returns `true` if back faces are never culled for this triangle.
    #[inline]
    pub fn is_two_sided(&self) -> bool {
        self.two_sided
    }

    /// Returns the precomputed area.
    #[inline]
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Returns vertex `i` (0, 1 or 2) of the triangle.
    #[inline]
    pub fn vertex<'a>(&self, vertices: &'a VertexBuffer, i: usize) -> &'a Vertex {
        vertices.vertex(self.indices[i])
    }

    /// Returns the three corner positions.
    #[inline]
    pub fn positions(&self, vertices: &VertexBuffer) -> [Point3<f32>; 3] {
        self.indices.map(|i| vertices.position(i))
    }

    /// Computes the (unnormalized) geometric normal, twice the area in length.
    pub fn normal(&self, vertices: &VertexBuffer) -> Vector3<f32> {
        let [a, b, c] = self.positions(vertices);
        (b - a).cross(&(c - a))
    }

    /// Computes the unit geometric normal.
    ///
    /// Returns `None` if the triangle is degenerate (zero area).
    pub fn unit_normal(&self, vertices: &VertexBuffer) -> Option<Vector3<f32>> {
        let n = self.normal(vertices);
        let len = n.norm();
        if len > f32::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Returns the tight bounding box of the triangle.
    pub fn bounds(&self, vertices: &VertexBuffer) -> Aabb {
        Aabb::from_points(&self.positions(vertices))
    }

    /// Interpolates the position at barycentric `(u, v)`, weighting vertex 1
    /// by `u`, vertex 2 by `v` and vertex 0 by `1 - u - v`.
    pub fn position_at(&self, vertices: &VertexBuffer, u: f32, v: f32) -> Point3<f32> {
        let [a, b, c] = self.positions(vertices);
        let w = 1.0 - u - v;
        Point3::from(a.coords * w + b.coords * u + c.coords * v)
    }

    /// Interpolates the texture coordinate at barycentric `(u, v)`.
    pub fn tex_coord_at(&self, vertices: &VertexBuffer, u: f32, v: f32) -> Vector2<f32> {
        let w = 1.0 - u - v;
        self.vertex(vertices, 0).tex_coord * w
            + self.vertex(vertices, 1).tex_coord * u
            + self.vertex(vertices, 2).tex_coord * v
    }

    /// Returns `true` if the surface is covered at barycentric `(u, v)` to at
    /// least `threshold`. Triangles without a coverage source always pass.
    pub fn passes_coverage(&self, vertices: &VertexBuffer, u: f32, v: f32, threshold: f32) -> bool {
        match &self.coverage {
            None => true,
            Some(coverage) => coverage.coverage(self.tex_coord_at(vertices, u, v)) >= threshold,
        }
    }
}

/// Checks that every index addresses a vertex of `vertices`.
pub(crate) fn check_indices(vertices: &VertexBuffer, indices: &[u32; 3]) -> Result<()> {
    match indices.iter().find(|&&i| i as usize >= vertices.len()) {
        Some(&index) => Err(TreeError::VertexOutOfRange {
            index,
            len: vertices.len(),
        }),
        None => Ok(()),
    }
}
