//! The shared vertex buffer triangles index into.

use nalgebra::{Point3, Vector2, Vector3, Vector4};

/// A single vertex with the attributes a triangle query may interpolate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Object-space position.
    pub position: Point3<f32>,
    /// Shading normal (not necessarily unit length).
    pub normal: Vector3<f32>,
    /// Tangent with the bitangent sign in `w`.
    pub tangent: Vector4<f32>,
    /// Texture coordinate, used by partial-coverage tests.
    pub tex_coord: Vector2<f32>,
}

impl Vertex {
    /// Creates a vertex at `position` with zero normal, tangent and texture coordinate.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            tangent: Vector4::zeros(),
            tex_coord: Vector2::zeros(),
        }
    }

    /// Sets the shading normal.
    pub fn with_normal(mut self, normal: Vector3<f32>) -> Self {
        self.normal = normal;
        self
    }

    /// Sets the texture coordinate.
    pub fn with_tex_coord(mut self, tex_coord: Vector2<f32>) -> Self {
        self.tex_coord = tex_coord;
        self
    }
}

/// Read-only vertex storage shared between a tree and whoever owns the mesh.
///
/// Trees hold it behind an `Arc` so the buffer outlives every query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffer {
    vertices: Vec<Vertex>,
}

impl VertexBuffer {
    /// Wraps a list of vertices.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// Builds a buffer of bare positions.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        positions.into_iter().map(Vertex::new).collect()
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the buffer holds no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns all vertices.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the vertex at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range. Triangles are validated against the
    /// buffer before a tree is built, so tree queries never hit this.
    #[inline]
    pub fn vertex(&self, index: u32) -> &Vertex {
        &self.vertices[index as usize]
    }

    /// Returns the position of the vertex at `index`.
    #[inline]
    pub fn position(&self, index: u32) -> Point3<f32> {
        self.vertex(index).position
    }
}

impl From<Vec<Vertex>> for VertexBuffer {
    fn from(vertices: Vec<Vertex>) -> Self {
        Self::new(vertices)
    }
}

impl FromIterator<Vertex> for VertexBuffer {
    fn from_iter<I: IntoIterator<Item = Vertex>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
