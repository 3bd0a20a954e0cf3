//! Exact primitive tests against single triangles.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Ray, Sphere, Tri, VertexBuffer};

/// Determinant magnitude below which a ray counts as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-12;

/// Barycentric slack, scaled by the inverse determinant. Rays along a shared
/// edge land inside both neighbours' tolerance bands instead of falling
/// through the crack between them.
const CONSERVATIVE_EPSILON: f32 = 1e-8;

bitflags::bitflags! {
    /// Options for ray queries.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct IntersectRayOptions: u8 {
        /// Report hits on back faces of one-sided triangles.
        const DO_NOT_CULL_BACKFACES = 0b0000_0001;
        /// Skip the partial-coverage (alpha) test.
        const NO_PARTIAL_COVERAGE_TEST = 0b0000_0010;
        /// Require full coverage (1.0) instead of the default 0.5.
        const PARTIAL_COVERAGE_THRESHOLD_ZERO = 0b0000_0100;
        /// Stop at the first accepted hit rather than the nearest one.
        const OCCLUSION_TEST_ONLY = 0b0000_1000;
        /// Shadow-ray preset: any hit, no coverage test.
        const COHERENT_OCCLUSION =
            Self::NO_PARTIAL_COVERAGE_TEST.bits() | Self::OCCLUSION_TEST_ONLY.bits();
    }
}

impl IntersectRayOptions {
    /// Coverage a hit must reach to be accepted.
    #[inline]
    pub fn coverage_threshold(self) -> f32 {
        if self.contains(Self::PARTIAL_COVERAGE_THRESHOLD_ZERO) {
            1.0
        } else {
            0.5
        }
    }
}

/// A ray-triangle intersection.
///
/// `u` weights the triangle's second vertex and `v` its third; the first
/// vertex has weight [`Hit::barycentric_w`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the triangle in the tree's triangle array.
    pub tri_index: usize,
    /// Parametric distance along the ray.
    pub distance: f32,
    /// Barycentric coordinate of vertex 1.
    pub u: f32,
    /// Barycentric coordinate of vertex 2.
    pub v: f32,
    /// `true` if the ray struck the side facing away from the winding normal.
    pub backface: bool,
}

impl Hit {
    /// Barycentric weight of vertex 0.
    #[inline]
    pub fn barycentric_w(&self) -> f32 {
        1.0 - self.u - self.v
    }
}

/// Intersects `ray` with triangle `tri_index`, accepting only hits with
/// `ray.min_distance() < distance < max_distance`.
///
/// One-sided triangles are culled when hit from behind unless
/// [`IntersectRayOptions::DO_NOT_CULL_BACKFACES`] is set. Triangles with a
/// coverage source must pass the partial-coverage test at the hit point
/// unless [`IntersectRayOptions::NO_PARTIAL_COVERAGE_TEST`] is set.
pub fn ray_triangle(
    ray: &Ray,
    tri_index: usize,
    tri: &Tri,
    vertices: &VertexBuffer,
    max_distance: f32,
    options: IntersectRayOptions,
) -> Option<Hit> {
    let [v0, v1, v2] = tri.positions(vertices);
    let dir = ray.direction();
    let e1 = v1 - v0;
    let e2 = v2 - v0;

    let cull = !(options.contains(IntersectRayOptions::DO_NOT_CULL_BACKFACES) || tri.is_two_sided());
    if cull && tri.area() > 0.0 {
        let facing = e1.cross(&e2).dot(&dir);
        if facing >= -PARALLEL_EPSILON * 2.0 * tri.area() {
            return None;
        }
    }

    let p = dir.cross(&e2);
    let a = e1.dot(&p);
    let f = 1.0 / a;
    let slack = (CONSERVATIVE_EPSILON * f).abs();

    let s = (ray.origin() - v0) * f;
    let u = s.dot(&p);
    if u < -slack || u > 1.0 + slack {
        return None;
    }

    let q = s.cross(&e1);
    let v = dir.dot(&q);
    if v < -slack || u + v > 1.0 + slack || a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = e2.dot(&q);
    if !(t > ray.min_distance() && t < max_distance) {
        return None;
    }

    if !options.contains(IntersectRayOptions::NO_PARTIAL_COVERAGE_TEST)
        && !tri.passes_coverage(vertices, u, v, options.coverage_threshold())
    {
        return None;
    }

    Some(Hit {
        tri_index,
        distance: t,
        u,
        v,
        backface: a < 0.0,
    })
}

/// Returns the point of triangle `abc` closest to `p`.
///
/// Classifies `p` against the triangle's Voronoi regions (three vertices,
/// three edges, the face) and projects onto the matching feature.
pub fn closest_point_on_triangle(
    p: &Point3<f32>,
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
) -> Point3<f32> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Returns `true` if the triangle touches the solid sphere.
pub fn triangle_intersects_sphere(corners: &[Point3<f32>; 3], sphere: &Sphere) -> bool {
    let [a, b, c] = corners;
    let closest = closest_point_on_triangle(&sphere.center, a, b, c);
    sphere.contains_point(&closest)
}

/// Returns `true` if the triangle touches the solid box.
///
/// Separating-axis test over the three box normals, the triangle normal and
/// the nine box-edge/triangle-edge cross products.
pub fn triangle_intersects_box(corners: &[Point3<f32>; 3], bounds: &Aabb) -> bool {
    if bounds.is_empty() {
        return false;
    }
    let center = bounds.center();
    let half = bounds.extent() * 0.5;
    let v = corners.map(|p| p - center);

    for a in 0..3 {
        let min = v[0][a].min(v[1][a]).min(v[2][a]);
        let max = v[0][a].max(v[1][a]).max(v[2][a]);
        if min > half[a] || max < -half[a] {
            return false;
        }
    }

    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    let normal = edges[0].cross(&edges[1]);
    if normal.dot(&v[0]).abs() > half.dot(&normal.abs()) {
        return false;
    }

    for edge in &edges {
        for a in 0..3 {
            let axis = Vector3::ith(a, 1.0).cross(edge);
            if separates(&v, &axis, &half) {
                return false;
            }
        }
    }

    true
}

/// Returns `true` if the projections of the triangle and the box onto `axis`
/// are disjoint.
#[inline]
fn separates(v: &[Vector3<f32>; 3], axis: &Vector3<f32>, half: &Vector3<f32>) -> bool {
    let p0 = v[0].dot(axis);
    let p1 = v[1].dot(axis);
    let p2 = v[2].dot(axis);
    let r = half.dot(&axis.abs());
    p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConstantCoverage;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    /// Unit right triangle in z = 0, wound counter-clockwise seen from +z.
    fn make_tri() -> (VertexBuffer, Tri) {
        let buffer = VertexBuffer::from_positions([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let tri = Tri::new(&buffer, [0, 1, 2]).unwrap();
        (buffer, tri)
    }

    fn down_ray(x: f32, y: f32) -> Ray {
        Ray::new(Point3::new(x, y, 2.0), Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn front_face_hit_reports_barycentrics() {
        let (buffer, tri) = make_tri();
        let hit = ray_triangle(
            &down_ray(0.25, 0.5),
            3,
            &tri,
            &buffer,
            f32::INFINITY,
            IntersectRayOptions::empty(),
        )
        .unwrap();

        assert_eq!(hit.tri_index, 3);
        assert_relative_eq!(hit.distance, 2.0);
        assert_relative_eq!(hit.u, 0.25);
        assert_relative_eq!(hit.v, 0.5);
        assert_relative_eq!(hit.barycentric_w(), 0.25);
        assert!(!hit.backface);
    }

    #[test]
    fn back_face_is_culled_unless_disabled() {
        let (buffer, tri) = make_tri();
        let up = Ray::new(Point3::new(0.25, 0.25, -2.0), Vector3::new(0.0, 0.0, 1.0));

        let culled = ray_triangle(&up, 0, &tri, &buffer, f32::INFINITY, IntersectRayOptions::empty());
        assert!(culled.is_none());

        let hit = ray_triangle(
            &up,
            0,
            &tri,
            &buffer,
            f32::INFINITY,
            IntersectRayOptions::DO_NOT_CULL_BACKFACES,
        )
        .unwrap();
        assert!(hit.backface);
        assert_relative_eq!(hit.distance, 2.0);

        let two_sided = tri.clone().with_two_sided(true);
        let hit = ray_triangle(&up, 0, &two_sided, &buffer, f32::INFINITY, IntersectRayOptions::empty());
        assert!(hit.is_some_and(|h| h.backface));
    }

    #[test]
    fn miss_outside_triangle() {
        let (buffer, tri) = make_tri();
        let options = IntersectRayOptions::empty();
        assert!(ray_triangle(&down_ray(0.8, 0.8), 0, &tri, &buffer, f32::INFINITY, options).is_none());
        assert!(ray_triangle(&down_ray(-0.1, 0.5), 0, &tri, &buffer, f32::INFINITY, options).is_none());
    }

    #[test]
    fn distance_window_is_open() {
        let (buffer, tri) = make_tri();
        let options = IntersectRayOptions::empty();
        let ray = down_ray(0.2, 0.2);
        assert!(ray_triangle(&ray, 0, &tri, &buffer, 2.0, options).is_none());
        assert!(ray_triangle(&ray, 0, &tri, &buffer, 2.5, options).is_some());

        let late_start = down_ray(0.2, 0.2).with_range(2.0, f32::INFINITY);
        assert!(ray_triangle(&late_start, 0, &tri, &buffer, f32::INFINITY, options).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let (buffer, tri) = make_tri();
        let ray = Ray::new(Point3::new(-1.0, 0.2, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let options = IntersectRayOptions::DO_NOT_CULL_BACKFACES;
        assert!(ray_triangle(&ray, 0, &tri, &buffer, f32::INFINITY, options).is_none());
    }

    #[test]
    fn shared_edge_is_hit_by_at_least_one_neighbour() {
        // Two triangles forming the unit square, sharing the diagonal.
        let buffer = VertexBuffer::from_positions([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let lower = Tri::new(&buffer, [0, 1, 2]).unwrap();
        let upper = Tri::new(&buffer, [0, 2, 3]).unwrap();
        let options = IntersectRayOptions::empty();

        for i in 1..10 {
            let t = i as f32 / 10.0;
            let ray = down_ray(t, t);
            let hits = [&lower, &upper]
                .iter()
                .filter(|tri| ray_triangle(&ray, 0, tri, &buffer, f32::INFINITY, options).is_some())
                .count();
            assert!(hits >= 1, "ray through ({t}, {t}) fell through the diagonal");
        }
    }

    #[test]
    fn coverage_threshold_filters_hits() {
        let (buffer, tri) = make_tri();
        let translucent = tri.with_coverage(Arc::new(ConstantCoverage(0.7)));
        let ray = down_ray(0.2, 0.2);

        let default = IntersectRayOptions::empty();
        assert!(ray_triangle(&ray, 0, &translucent, &buffer, f32::INFINITY, default).is_some());

        let strict = IntersectRayOptions::PARTIAL_COVERAGE_THRESHOLD_ZERO;
        assert!(ray_triangle(&ray, 0, &translucent, &buffer, f32::INFINITY, strict).is_none());

        let skip = strict | IntersectRayOptions::NO_PARTIAL_COVERAGE_TEST;
        assert!(ray_triangle(&ray, 0, &translucent, &buffer, f32::INFINITY, skip).is_some());
    }

    #[test]
    fn coherent_occlusion_preset() {
        let preset = IntersectRayOptions::COHERENT_OCCLUSION;
        assert!(preset.contains(IntersectRayOptions::OCCLUSION_TEST_ONLY));
        assert!(preset.contains(IntersectRayOptions::NO_PARTIAL_COVERAGE_TEST));
        assert!(!preset.contains(IntersectRayOptions::DO_NOT_CULL_BACKFACES));
        assert_eq!(IntersectRayOptions::default(), IntersectRayOptions::empty());
    }

    #[test]
    fn closest_point_regions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        // Vertex region.
        let p = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &a, &b, &c);
        assert_eq!(p, a);
        // Edge region.
        let p = closest_point_on_triangle(&Point3::new(0.5, -1.0, 0.0), &a, &b, &c);
        assert_relative_eq!(p, Point3::new(0.5, 0.0, 0.0));
        // Face region.
        let p = closest_point_on_triangle(&Point3::new(0.2, 0.3, 4.0), &a, &b, &c);
        assert_relative_eq!(p, Point3::new(0.2, 0.3, 0.0), epsilon = 1e-6);
        // Hypotenuse.
        let p = closest_point_on_triangle(&Point3::new(1.0, 1.0, 0.0), &a, &b, &c);
        assert_relative_eq!(p, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn sphere_test() {
        let (buffer, tri) = make_tri();
        let corners = tri.positions(&buffer);
        assert!(triangle_intersects_sphere(
            &corners,
            &Sphere::new(Point3::new(0.2, 0.2, 0.5), 0.6)
        ));
        assert!(!triangle_intersects_sphere(
            &corners,
            &Sphere::new(Point3::new(0.2, 0.2, 0.5), 0.4)
        ));
        // Bounding boxes overlap but the hypotenuse keeps the sphere out.
        assert!(!triangle_intersects_sphere(
            &corners,
            &Sphere::new(Point3::new(0.9, 0.9, 0.0), 0.3)
        ));
    }

    #[test]
    fn box_test() {
        let (buffer, tri) = make_tri();
        let corners = tri.positions(&buffer);
        let cube = |low: [f32; 3], high: [f32; 3]| {
            Aabb::new(Point3::from(low), Point3::from(high))
        };

        assert!(triangle_intersects_box(&corners, &cube([0.1, 0.1, -0.1], [0.2, 0.2, 0.1])));
        // Box inside the triangle's bounds but beyond the hypotenuse.
        assert!(!triangle_intersects_box(&corners, &cube([0.8, 0.8, -0.1], [0.9, 0.9, 0.1])));
        // Box above the triangle's plane.
        assert!(!triangle_intersects_box(&corners, &cube([0.1, 0.1, 0.1], [0.2, 0.2, 0.2])));
        // Box touching the plane from above.
        assert!(triangle_intersects_box(&corners, &cube([0.1, 0.1, 0.0], [0.2, 0.2, 0.2])));
        // Triangle entirely inside.
        assert!(triangle_intersects_box(&corners, &cube([-1.0, -1.0, -1.0], [2.0, 2.0, 1.0])));
        assert!(!triangle_intersects_box(&corners, &Aabb::empty()));
    }
}
