//! Rays with a precomputed inverse direction.

use nalgebra::{Point3, Vector3};

use crate::Aabb;

/// Relative slack applied to the exit distance of the slab test so that rays
/// grazing a box face are not lost to rounding.
const SLAB_SLACK: f32 = 4.0 * f32::EPSILON;

/// A ray `origin + t * direction` valid for `t` in `(min_distance, max_distance)`.
///
/// Distances are measured in units of the direction's length; use a unit
/// direction for Euclidean distances. The direction is not required to be
/// non-zero: a zero component yields an infinite inverse, and the slab test
/// treats such axes separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3<f32>,
    direction: Vector3<f32>,
    inv_direction: Vector3<f32>,
    min_distance: f32,
    max_distance: f32,
}

impl Ray {
    /// Creates a ray valid for `t` in `(0, inf)`.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.map(|d| 1.0 / d),
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }

    /// Creates a ray from `from` toward `to`, ending at `to`.
    ///
    /// The direction is normalized, so distances are Euclidean.
    pub fn between(from: Point3<f32>, to: Point3<f32>) -> Self {
        let delta = to - from;
        let length = delta.norm();
        Self::new(from, delta / length).with_range(0.0, length)
    }

    /// Returns the ray restricted to `t` in `(min_distance, max_distance)`.
    pub fn with_range(mut self, min_distance: f32, max_distance: f32) -> Self {
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self
    }

    /// Returns the origin of the ray.
    #[inline]
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    /// Returns the direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// Returns the componentwise reciprocal of the direction.
    #[inline]
    pub fn inv_direction(&self) -> Vector3<f32> {
        self.inv_direction
    }

    /// Hits at or before this distance are ignored.
    #[inline]
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Hits at or after this distance are ignored.
    #[inline]
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Evaluates the ray at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Slab test: returns `true` if the ray touches `bounds` for some `t` in
    /// `[min_distance, max_distance]`.
    ///
    /// Boundary contact counts as a hit, including rays travelling exactly
    /// along a face. The empty box is never hit.
    pub fn intersects_aabb(&self, bounds: &Aabb, max_distance: f32) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let low = bounds.low();
        let high = bounds.high();

        let mut t_near = self.min_distance;
        let mut t_far = max_distance;

        for i in 0..3 {
            if self.direction[i] == 0.0 {
                // Parallel to the slab: either always inside it or never.
                if self.origin[i] < low[i] || self.origin[i] > high[i] {
                    return false;
                }
                continue;
            }

            let t0 = (low[i] - self.origin[i]) * self.inv_direction[i];
            let t1 = (high[i] - self.origin[i]) * self.inv_direction[i];
            let (entry, exit) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

            t_near = t_near.max(entry);
            t_far = t_far.min(exit);
        }

        t_near <= t_far + SLAB_SLACK * t_far.abs()
    }
}
