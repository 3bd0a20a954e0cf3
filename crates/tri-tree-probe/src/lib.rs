//! Procedural scenes and camera rays for exercising triangle trees.

use nalgebra::{Point3, Rotation3, Vector3};
use tri_tree::{Ray, VertexBuffer};

/// An indexed triangle list under construction.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub indices: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn tri_count(&self) -> usize {
        self.indices.len()
    }

    /// Appends a quad as two triangles. Corners are counter-clockwise seen
    /// from the front.
    pub fn push_quad(&mut self, corners: [Point3<f32>; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend(corners);
        self.indices.push([base, base + 1, base + 2]);
        self.indices.push([base, base + 2, base + 3]);
    }

    /// Appends a cube of edge length `size`, rotated about its center.
    pub fn push_cube(&mut self, center: Point3<f32>, size: f32, rotation: &Rotation3<f32>) {
        let half = size / 2.0;

        let unit_corners = [
            Vector3::new(-half, -half, -half),
            Vector3::new(half, -half, -half),
            Vector3::new(half, half, -half),
            Vector3::new(-half, half, -half),
            Vector3::new(-half, -half, half),
            Vector3::new(half, -half, half),
            Vector3::new(half, half, half),
            Vector3::new(-half, half, half),
        ];
        let corners = unit_corners.map(|v| center + rotation * v);

        // Counter-clockwise winding viewed from outside
        let faces: [[usize; 4]; 6] = [
            [4, 5, 6, 7], // front (+Z)
            [1, 0, 3, 2], // back (-Z)
            [0, 4, 7, 3], // left (-X)
            [5, 1, 2, 6], // right (+X)
            [7, 6, 2, 3], // top (+Y)
            [0, 1, 5, 4], // bottom (-Y)
        ];
        for face in faces {
            self.push_quad(face.map(|i| corners[i]));
        }
    }

    /// Appends a latitude/longitude sphere.
    pub fn push_sphere(&mut self, center: Point3<f32>, radius: f32, rings: u32, segments: u32) {
        debug_assert!(rings >= 2 && segments >= 3);
        let base = self.positions.len() as u32;

        for ring in 0..=rings {
            let theta = std::f32::consts::PI * ring as f32 / rings as f32;
            for segment in 0..segments {
                let phi = std::f32::consts::TAU * segment as f32 / segments as f32;
                let dir = Vector3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                self.positions.push(center + dir * radius);
            }
        }

        let at = |ring: u32, segment: u32| base + ring * segments + segment % segments;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = at(ring, segment);
                let b = at(ring, segment + 1);
                let c = at(ring + 1, segment + 1);
                let d = at(ring + 1, segment);
                // Outward winding; the pole rows produce zero-area triangles,
                // which the tree skips.
                self.indices.push([a, b, c]);
                self.indices.push([a, c, d]);
            }
        }
    }

    /// Appends a square floor at height `y`, facing +Y.
    pub fn push_floor(&mut self, y: f32, half_size: f32) {
        let h = half_size;
        self.push_quad([
            Point3::new(-h, y, h),
            Point3::new(h, y, h),
            Point3::new(h, y, -h),
            Point3::new(-h, y, -h),
        ]);
    }

    /// Splits the mesh into a vertex buffer and index list for building.
    pub fn into_parts(self) -> (VertexBuffer, Vec<[u32; 3]>) {
        (VertexBuffer::from_positions(self.positions), self.indices)
    }
}

/// Two cubes, a sphere and a floor.
pub fn demo_scene() -> Mesh {
    let mut mesh = Mesh::new();
    let rotation = Rotation3::from_euler_angles(0.3, 0.4, 0.25);
    mesh.push_cube(Point3::new(-1.0, 0.0, 0.0), 0.8, &rotation);
    mesh.push_cube(Point3::new(1.0, 0.0, 0.0), 0.8, &Rotation3::identity());
    mesh.push_sphere(Point3::new(0.0, 0.2, -1.2), 0.6, 24, 48);
    mesh.push_floor(-1.0, 3.0);
    mesh
}

/// Pinhole camera producing one primary ray per pixel.
#[derive(Debug, Clone, Copy)]
pub struct PinholeCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    /// Vertical field of view in radians.
    pub fov: f32,
}

impl PinholeCamera {
    /// Creates a camera looking from `eye` at `target` with a 60 degree field of view.
    pub fn new(eye: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            eye,
            target,
            fov: 60f32.to_radians(),
        }
    }

    /// Sets the vertical field of view in radians.
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Generates row-major rays through the pixel centers of a
    /// `width` x `height` image.
    pub fn rays(&self, width: u32, height: u32) -> Vec<Ray> {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);

        let scale = (self.fov * 0.5).tan();
        let aspect = width as f32 / height as f32;

        let mut rays = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let sx = (2.0 * (x as f32 + 0.5) / width as f32 - 1.0) * scale * aspect;
                let sy = (1.0 - 2.0 * (y as f32 + 0.5) / height as f32) * scale;
                let dir = (forward + right * sx + up * sy).normalize();
                rays.push(Ray::new(self.eye, dir));
            }
        }
        rays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_twelve_triangles() {
        let mut mesh = Mesh::new();
        mesh.push_cube(Point3::origin(), 1.0, &Rotation3::identity());
        assert_eq!(mesh.tri_count(), 12);
        assert_eq!(mesh.positions.len(), 24);
    }

    #[test]
    fn cube_faces_point_outward() {
        let mut mesh = Mesh::new();
        mesh.push_cube(Point3::origin(), 1.0, &Rotation3::identity());
        for [a, b, c] in &mesh.indices {
            let (a, b, c) = (
                mesh.positions[*a as usize],
                mesh.positions[*b as usize],
                mesh.positions[*c as usize],
            );
            let normal = (b - a).cross(&(c - a));
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_counts() {
        let mut mesh = Mesh::new();
        mesh.push_sphere(Point3::origin(), 1.0, 4, 8);
        assert_eq!(mesh.positions.len(), 5 * 8);
        assert_eq!(mesh.tri_count(), 2 * 4 * 8);
    }

    #[test]
    fn camera_ray_count_and_center() {
        let camera = PinholeCamera::new(Point3::new(0.0, 0.0, 5.0), Point3::origin());
        let rays = camera.rays(3, 3);
        assert_eq!(rays.len(), 9);
        let center = rays[4].direction();
        assert!((center - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }
}
