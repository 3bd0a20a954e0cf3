//! Build-time triangle fragments and axis-plane clipping.
//!
//! A [`Poly`] starts out as a copy of one source triangle's corners. Splitting
//! a node clips straddling polys against the axis-aligned split plane, so a
//! source triangle can end up as several convex fragments in different
//! subtrees. Polys exist only while a tree is being built.

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::{Aabb, Axis, Tri, VertexBuffer};

type Vertices = SmallVec<[Point3<f32>; 8]>;

/// Side of an axis-aligned plane a vertex lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Below,
    Above,
    OnPlane,
}

/// A convex fragment of one source triangle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Poly {
    source: u32,
    area: f32,
    vertices: Vertices,
    bounds: Aabb,
}

impl Poly {
    /// Wraps the whole of triangle `source`.
    pub(crate) fn new(source: u32, tri: &Tri, vertices: &VertexBuffer) -> Self {
        let corners: Vertices = tri.positions(vertices).into_iter().collect();
        let bounds = Aabb::from_points(&corners);
        Self {
            source,
            area: tri.area(),
            vertices: corners,
            bounds,
        }
    }

    /// Index of the source triangle in the tree's triangle array.
    #[inline]
    pub(crate) fn source(&self) -> u32 {
        self.source
    }

    /// Area of the whole source triangle, not of this fragment.
    #[inline]
    pub(crate) fn area(&self) -> f32 {
        self.area
    }

    /// Current (possibly clipped) bounds.
    #[inline]
    pub(crate) fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    #[inline]
    pub(crate) fn low(&self) -> Point3<f32> {
        self.bounds.low()
    }

    #[inline]
    pub(crate) fn high(&self) -> Point3<f32> {
        self.bounds.high()
    }

    /// Polygon corners of the fragment.
    #[cfg(test)]
    pub(crate) fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Sorts polys by the upper extent of their bounds along `axis`.
    ///
    /// The sort is stable, so equal extents keep their input order.
    pub(crate) fn sort_by_high(polys: &mut [Poly], axis: Axis) {
        let a = axis.index();
        polys.sort_by(|p, q| p.high()[a].total_cmp(&q.high()[a]));
    }

    /// Union of the bounds of `polys`.
    pub(crate) fn compute_bounds(polys: &[Poly]) -> Aabb {
        let mut bounds = Aabb::empty();
        for poly in polys {
            bounds.grow(&poly.bounds);
        }
        bounds
    }

    /// Classifies this poly against the plane `coordinate[axis] == location`.
    ///
    /// - entirely at or below the plane: appended to `low`
    /// - entirely at or above the plane: appended to `high`
    /// - straddling: clipped into a low and a high fragment, appended to `low`
    ///   and `high` respectively, unless the source triangle's area exceeds
    ///   `max_area`, in which case the poly is appended unchanged to `span`
    ///   so that large triangles are not multiplied at every level
    pub(crate) fn split(
        &self,
        axis: Axis,
        location: f32,
        max_area: f32,
        low: &mut Vec<Poly>,
        high: &mut Vec<Poly>,
        span: &mut Vec<Poly>,
    ) {
        let a = axis.index();
        if self.high()[a] <= location {
            low.push(self.clone());
        } else if self.low()[a] >= location {
            high.push(self.clone());
        } else if self.area > max_area {
            span.push(self.clone());
        } else {
            let (below, above) = self.clip(axis, location);
            if let Some(p) = below {
                low.push(p);
            }
            if let Some(p) = above {
                high.push(p);
            }
        }
    }

    /// Clips a straddling poly into its parts below and above the plane.
    ///
    /// Walks the polygon edges Sutherland-Hodgman style, emitting crossing
    /// points into both lists. Fragment bounds are clamped to this poly's
    /// bounds and to the plane, so they never exceed the parent.
    fn clip(&self, axis: Axis, location: f32) -> (Option<Poly>, Option<Poly>) {
        let a = axis.index();
        let n = self.vertices.len();

        let mut below = Vertices::new();
        let mut above = Vertices::new();

        let sides: SmallVec<[Side; 8]> = self
            .vertices
            .iter()
            .map(|v| classify(v[a], location))
            .collect();

        for i in 0..n {
            let current = self.vertices[i];
            let current_side = sides[i];
            let next_idx = (i + 1) % n;
            let next = self.vertices[next_idx];
            let next_side = sides[next_idx];

            match current_side {
                Side::Below => below.push(current),
                Side::Above => above.push(current),
                Side::OnPlane => {
                    below.push(current);
                    above.push(current);
                }
            }

            let crosses = matches!(
                (current_side, next_side),
                (Side::Below, Side::Above) | (Side::Above, Side::Below)
            );

            if crosses {
                let t = (location - current[a]) / (next[a] - current[a]);
                let mut crossing = current + (next - current) * t;
                crossing[a] = location;
                below.push(crossing);
                above.push(crossing);
            }
        }

        let mut below_limit = self.bounds;
        let mut above_limit = self.bounds;
        {
            let mut high = below_limit.high();
            high[a] = high[a].min(location);
            below_limit = Aabb::new(below_limit.low(), high);

            let mut low = above_limit.low();
            low[a] = low[a].max(location);
            above_limit = Aabb::new(low, above_limit.high());
        }

        (
            self.fragment(below, &below_limit),
            self.fragment(above, &above_limit),
        )
    }

    fn fragment(&self, vertices: Vertices, limit: &Aabb) -> Option<Poly> {
        if vertices.len() < 3 {
            return None;
        }
        let bounds = Aabb::from_points(&vertices).intersection(limit);
        if bounds.is_empty() {
            return None;
        }
        Some(Poly {
            source: self.source,
            area: self.area,
            vertices,
            bounds,
        })
    }
}

#[inline]
fn classify(coordinate: f32, location: f32) -> Side {
    if coordinate < location {
        Side::Below
    } else if coordinate > location {
        Side::Above
    } else {
        Side::OnPlane
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_poly(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Poly {
        let buffer = VertexBuffer::from_positions(
            [a, b, c].into_iter().map(|p| Point3::new(p[0], p[1], p[2])),
        );
        let tri = Tri::new(&buffer, [0, 1, 2]).unwrap();
        Poly::new(7, &tri, &buffer)
    }

    struct Lists {
        low: Vec<Poly>,
        high: Vec<Poly>,
        span: Vec<Poly>,
    }

    fn split(poly: &Poly, axis: Axis, location: f32, max_area: f32) -> Lists {
        let mut lists = Lists {
            low: Vec::new(),
            high: Vec::new(),
            span: Vec::new(),
        };
        poly.split(axis, location, max_area, &mut lists.low, &mut lists.high, &mut lists.span);
        lists
    }

    #[test]
    fn new_poly_covers_triangle() {
        let poly = make_poly([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 3.0]);
        assert_eq!(poly.source(), 7);
        assert_eq!(poly.vertices().len(), 3);
        assert_eq!(poly.low(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(poly.high(), Point3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn entirely_below_goes_low() {
        let poly = make_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let lists = split(&poly, Axis::X, 1.0, f32::INFINITY);
        assert_eq!(lists.low.len(), 1);
        assert!(lists.high.is_empty());
        assert!(lists.span.is_empty());
        assert_eq!(lists.low[0], poly);
    }

    #[test]
    fn entirely_above_goes_high() {
        let poly = make_poly([1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        let lists = split(&poly, Axis::X, 1.0, f32::INFINITY);
        assert!(lists.low.is_empty());
        assert_eq!(lists.high.len(), 1);
    }

    #[test]
    fn straddling_is_clipped_into_both_sides() {
        let poly = make_poly([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let lists = split(&poly, Axis::X, 1.0, f32::INFINITY);

        assert_eq!(lists.low.len(), 1);
        assert_eq!(lists.high.len(), 1);
        assert!(lists.span.is_empty());

        let low = &lists.low[0];
        let high = &lists.high[0];
        assert_eq!(low.source(), 7);
        assert_eq!(high.source(), 7);

        // The low part is a quad, the high part the tip triangle.
        assert_eq!(low.vertices().len(), 4);
        assert_eq!(high.vertices().len(), 3);

        assert_eq!(low.high().x, 1.0);
        assert_eq!(high.low().x, 1.0);
        assert_eq!(high.high(), Point3::new(2.0, 1.0, 0.0));
        assert!(poly.bounds().contains(low.bounds()));
        assert!(poly.bounds().contains(high.bounds()));
    }

    #[test]
    fn large_straddling_goes_to_span() {
        let poly = make_poly([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let lists = split(&poly, Axis::X, 1.0, 1.0);
        assert!(lists.low.is_empty());
        assert!(lists.high.is_empty());
        assert_eq!(lists.span.len(), 1);
        assert_eq!(lists.span[0], poly);
    }

    #[test]
    fn vertex_on_plane_joins_both_fragments() {
        // Vertex b lies exactly on x = 1.
        let poly = make_poly([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [2.0, 0.0, 0.0]);
        let lists = split(&poly, Axis::X, 1.0, f32::INFINITY);
        assert_eq!(lists.low.len(), 1);
        assert_eq!(lists.high.len(), 1);
        assert_eq!(lists.low[0].vertices().len(), 3);
        assert_eq!(lists.high[0].vertices().len(), 3);
    }

    #[test]
    fn compute_bounds_is_union() {
        let a = make_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let b = make_poly([3.0, 0.0, 0.0], [4.0, 0.0, 0.0], [3.0, 1.0, 2.0]);
        let bounds = Poly::compute_bounds(&[a, b]);
        assert_eq!(bounds.low(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.high(), Point3::new(4.0, 1.0, 2.0));
        assert!(Poly::compute_bounds(&[]).is_empty());
    }

    #[test]
    fn repeated_clipping_stays_inside_parent() {
        let poly = make_poly([0.0, 0.0, 0.0], [3.0, 0.3, 0.0], [0.7, 2.9, 1.0]);
        let first = split(&poly, Axis::X, 1.3, f32::INFINITY);
        let low = &first.low[0];
        let second = split(low, Axis::Y, 0.9, f32::INFINITY);
        for fragment in second.low.iter().chain(second.high.iter()) {
            assert!(low.bounds().contains(fragment.bounds()));
            assert!(poly.bounds().contains(fragment.bounds()));
        }
    }
}
