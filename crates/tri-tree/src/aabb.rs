//! Axis-aligned bounding boxes and coordinate axes.

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::Sphere;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis.
    X = 0,
    /// The y axis.
    Y = 1,
    /// The z axis.
    Z = 2,
}

impl Axis {
    /// Returns the coordinate index of this axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the axis for a coordinate index.
    ///
    /// # Panics
    /// Panics if `index > 2`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("axis index {index} out of range"),
        }
    }

    /// Ranks the axes by the magnitude of `extent`, longest first.
    ///
    /// Ties on the longest axis resolve to the lowest index; the remaining two
    /// keep cyclic order unless the later one is strictly longer.
    pub fn ranked(extent: &Vector3<f32>) -> [Axis; 3] {
        let mut primary = 0;
        for i in 1..3 {
            if extent[i].abs() > extent[primary].abs() {
                primary = i;
            }
        }
        let second = (primary + 1) % 3;
        let third = (primary + 2) % 3;

        if extent[third].abs() > extent[second].abs() {
            [Self::from_index(primary), Self::from_index(third), Self::from_index(second)]
        } else {
            [Self::from_index(primary), Self::from_index(second), Self::from_index(third)]
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        })
    }
}

/// An axis-aligned box spanning `low..=high` on every axis.
///
/// The empty box has `low = +inf` and `high = -inf`, so growing it by any box
/// or point yields exactly that box or point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    low: Point3<f32>,
    high: Point3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Creates a box from its low and high corners.
    ///
    /// # Panics (debug builds only)
    /// Panics if `low` exceeds `high` on any axis.
    pub fn new(low: Point3<f32>, high: Point3<f32>) -> Self {
        debug_assert!(
            low.x <= high.x && low.y <= high.y && low.z <= high.z,
            "Aabb low corner must not exceed high corner"
        );
        Self { low, high }
    }

    /// Returns the empty box, the identity for [`Aabb::grow`].
    pub fn empty() -> Self {
        Self {
            low: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            high: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Returns the tightest box around `points` (empty if there are none).
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3<f32>>,
    {
        let mut bounds = Self::empty();
        for p in points {
            bounds.grow_point(p);
        }
        bounds
    }

    /// Returns the low corner.
    #[inline]
    pub fn low(&self) -> Point3<f32> {
        self.low
    }

    /// Returns the high corner.
    #[inline]
    pub fn high(&self) -> Point3<f32> {
        self.high
    }

    /// Returns `true` if the box contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low.x > self.high.x || self.low.y > self.high.y || self.low.z > self.high.z
    }

    /// Grows this box to also enclose `other`.
    #[inline]
    pub fn grow(&mut self, other: &Aabb) {
        self.low = self.low.inf(&other.low);
        self.high = self.high.sup(&other.high);
    }

    /// Grows this box to also enclose `point`.
    #[inline]
    pub fn grow_point(&mut self, point: &Point3<f32>) {
        self.low = self.low.inf(point);
        self.high = self.high.sup(point);
    }

    /// Returns the overlap of both boxes, which may be empty.
    #[inline]
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb {
            low: self.low.sup(&other.low),
            high: self.high.inf(&other.high),
        }
    }

    /// Returns the edge lengths of the box (zero for an empty box).
    pub fn extent(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.high - self.low
        }
    }

    /// Returns the center of the box.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.low, &self.high)
    }

    /// Returns the surface area of the box (zero for an empty box).
    pub fn area(&self) -> f32 {
        let e = self.extent();
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }

    /// Returns `true` if `other` lies entirely inside this box (boundary included).
    ///
    /// Every box contains the empty box.
    pub fn contains(&self, other: &Aabb) -> bool {
        if other.is_empty() {
            return true;
        }
        (0..3).all(|i| self.low[i] <= other.low[i] && other.high[i] <= self.high[i])
    }

    /// Returns `true` if `point` lies inside this box (boundary included).
    pub fn contains_point(&self, point: &Point3<f32>) -> bool {
        (0..3).all(|i| self.low[i] <= point[i] && point[i] <= self.high[i])
    }

    /// Returns `true` if the boxes overlap (touching counts as overlapping).
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.low[i] <= other.high[i] && other.low[i] <= self.high[i])
    }

    /// Returns `true` if the solid sphere overlaps this box.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        !self.is_empty()
            && self.squared_exterior_distance(&sphere.center) <= sphere.radius * sphere.radius
    }

    /// Squared distance from `point` to the nearest point of the box (zero inside).
    pub fn squared_exterior_distance(&self, point: &Point3<f32>) -> f32 {
        let mut d = 0.0;
        for i in 0..3 {
            let below = self.low[i] - point[i];
            let above = point[i] - self.high[i];
            let gap = below.max(above).max(0.0);
            d += gap * gap;
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(low: [f32; 3], high: [f32; 3]) -> Aabb {
        Aabb::new(
            Point3::new(low[0], low[1], low[2]),
            Point3::new(high[0], high[1], high[2]),
        )
    }

    #[test]
    fn empty_box_is_identity_for_grow() {
        let mut bounds = Aabb::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.area(), 0.0);

        let unit = make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        bounds.grow(&unit);
        assert_eq!(bounds, unit);
    }

    #[test]
    fn area_of_unit_cube() {
        let unit = make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert_eq!(unit.area(), 6.0);
        assert_eq!(unit.center(), Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn flat_box_has_nonzero_area() {
        let flat = make_box([0.0, 0.0, 0.0], [2.0, 3.0, 0.0]);
        assert_eq!(flat.area(), 12.0);
    }

    #[test]
    fn containment_includes_boundary() {
        let outer = make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let inner = make_box([0.0, 0.5, 0.5], [1.0, 1.0, 0.75]);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&Aabb::empty()));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = make_box([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        let c = make_box([1.5, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersection(&c).is_empty());
    }

    #[test]
    fn exterior_distance() {
        let unit = make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert_eq!(unit.squared_exterior_distance(&Point3::new(0.5, 0.5, 0.5)), 0.0);
        assert_eq!(unit.squared_exterior_distance(&Point3::new(3.0, 0.5, 0.5)), 4.0);
        assert_eq!(unit.squared_exterior_distance(&Point3::new(2.0, 2.0, 0.5)), 2.0);
    }

    #[test]
    fn sphere_overlap() {
        let unit = make_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert!(unit.intersects_sphere(&Sphere::new(Point3::new(2.0, 0.5, 0.5), 1.0)));
        assert!(!unit.intersects_sphere(&Sphere::new(Point3::new(2.0, 0.5, 0.5), 0.9)));
    }

    #[test]
    fn axis_display() {
        assert_eq!(format!("{} {} {}", Axis::X, Axis::Y, Axis::Z), "X Y Z");
    }

    #[test]
    fn ranked_axes_longest_first() {
        assert_eq!(
            Axis::ranked(&Vector3::new(1.0, 3.0, 2.0)),
            [Axis::Y, Axis::Z, Axis::X]
        );
        assert_eq!(
            Axis::ranked(&Vector3::new(1.0, 2.0, 3.0)),
            [Axis::Z, Axis::Y, Axis::X]
        );
        // Ties keep index order.
        assert_eq!(
            Axis::ranked(&Vector3::new(1.0, 1.0, 1.0)),
            [Axis::X, Axis::Y, Axis::Z]
        );
    }
}
