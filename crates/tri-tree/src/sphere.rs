//! Solid spheres for range queries.

use nalgebra::Point3;

/// A solid sphere given by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Point3<f32>,
    /// Radius of the sphere; never negative.
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere from a center and radius.
    ///
    /// # Panics (debug builds only)
    /// Panics if the radius is negative.
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        debug_assert!(radius >= 0.0, "Sphere radius cannot be negative");
        Self { center, radius }
    }

    /// Returns `true` if `point` lies inside or on the sphere.
    #[inline]
    pub fn contains_point(&self, point: &Point3<f32>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }
}
