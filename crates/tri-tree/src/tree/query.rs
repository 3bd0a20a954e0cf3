//! Ray and volume queries.

use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::intersect::{
    Hit, IntersectRayOptions, ray_triangle, triangle_intersects_box, triangle_intersects_sphere,
};
use crate::{Aabb, Ray, Sphere};

use super::node::{Node, NodeId};
use super::tri_tree::TriTree;

/// Mutable state of one ray traversal.
struct RayQuery<'a> {
    ray: &'a Ray,
    options: IntersectRayOptions,
    max_distance: f32,
    best: Option<Hit>,
}

impl RayQuery<'_> {
    #[inline]
    fn occlusion_only(&self) -> bool {
        self.options.contains(IntersectRayOptions::OCCLUSION_TEST_ONLY)
    }
}

impl TriTree {
    /// Finds the nearest triangle hit by `ray` within its distance range.
    ///
    /// With [`IntersectRayOptions::OCCLUSION_TEST_ONLY`] the first accepted
    /// hit is returned instead, which need not be the nearest.
    pub fn intersect_ray(&self, ray: &Ray, options: IntersectRayOptions) -> Option<Hit> {
        let root = self.root?;
        if ray.direction() == Vector3::zeros() {
            return None;
        }
        let mut query = RayQuery {
            ray,
            options,
            max_distance: ray.max_distance(),
            best: None,
        };
        self.ray_node(root, &mut query);
        query.best
    }

    /// Intersects every ray in parallel; `hits[i]` is the result for
    /// `rays[i]`.
    #[tracing::instrument(skip_all, fields(ray_count = rays.len()))]
    pub fn intersect_rays(&self, rays: &[Ray], options: IntersectRayOptions) -> Vec<Option<Hit>> {
        rays.par_iter()
            .map(|ray| self.intersect_ray(ray, options))
            .collect()
    }

    /// Like [`intersect_rays`](Self::intersect_rays), writing into `hits`
    /// so its allocation can be reused across batches.
    pub fn intersect_rays_into(
        &self,
        rays: &[Ray],
        hits: &mut Vec<Option<Hit>>,
        options: IntersectRayOptions,
    ) {
        rays.par_iter()
            .map(|ray| self.intersect_ray(ray, options))
            .collect_into_vec(hits);
    }

    /// Returns the indices of all triangles touching the solid sphere, each
    /// once, in no particular order.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Vec<usize> {
        let mut found = Vec::new();
        if let Some(root) = self.root {
            let mut seen = HashSet::new();
            self.volume_node(
                root,
                &|bounds: &Aabb| bounds.intersects_sphere(sphere),
                &|corners: &[Point3<f32>; 3]| triangle_intersects_sphere(corners, sphere),
                &mut seen,
                &mut found,
            );
        }
        found
    }

    /// Returns the indices of all triangles touching the solid box, each
    /// once, in no particular order.
    pub fn intersect_box(&self, bounds: &Aabb) -> Vec<usize> {
        let mut found = Vec::new();
        if let (Some(root), false) = (self.root, bounds.is_empty()) {
            let mut seen = HashSet::new();
            self.volume_node(
                root,
                &|b: &Aabb| b.intersects(bounds),
                &|corners: &[Point3<f32>; 3]| triangle_intersects_box(corners, bounds),
                &mut seen,
                &mut found,
            );
        }
        found
    }

    /// Returns `true` to stop the traversal (occlusion hit found).
    fn ray_node(&self, id: NodeId, query: &mut RayQuery<'_>) -> bool {
        let node = self.arena.node(id);

        let Some((axis, location, [low, high])) = node.split() else {
            return self.ray_values(node, query);
        };

        if !query.ray.intersects_aabb(node.bounds(), query.max_distance) {
            return false;
        }

        let axis = axis.index();
        let origin = query.ray.origin()[axis];
        let direction = query.ray.direction()[axis];

        let low_first = if direction != 0.0 {
            direction > 0.0
        } else {
            origin <= location
        };
        let (near, far) = if low_first { (low, high) } else { (high, low) };

        if self.ray_node(near, query) {
            return true;
        }

        if !node.values().is_empty()
            && query.ray.intersects_aabb(node.value_bounds(), query.max_distance)
            && self.ray_values(node, query)
        {
            return true;
        }

        if direction != 0.0 {
            let to_plane = (location - origin) * query.ray.inv_direction()[axis];
            if to_plane > query.max_distance {
                return false;
            }
        }

        self.ray_node(far, query)
    }

    fn ray_values(&self, node: &Node, query: &mut RayQuery<'_>) -> bool {
        for &value in self.arena.values(node.values()) {
            let index = value as usize;
            let hit = ray_triangle(
                query.ray,
                index,
                &self.tris[index],
                &self.vertices,
                query.max_distance,
                query.options,
            );
            if let Some(hit) = hit {
                query.max_distance = hit.distance;
                query.best = Some(hit);
                if query.occlusion_only() {
                    return true;
                }
            }
        }
        false
    }

    fn volume_node<B, T>(
        &self,
        id: NodeId,
        overlaps_bounds: &B,
        overlaps_tri: &T,
        seen: &mut HashSet<u32>,
        found: &mut Vec<usize>,
    ) where
        B: Fn(&Aabb) -> bool,
        T: Fn(&[Point3<f32>; 3]) -> bool,
    {
        let node = self.arena.node(id);
        if !overlaps_bounds(node.bounds()) {
            return;
        }

        if !node.values().is_empty() && overlaps_bounds(node.value_bounds()) {
            for &value in self.arena.values(node.values()) {
                // Each triangle is tested once, whichever leaf reaches it first.
                if seen.insert(value) {
                    let corners = self.tris[value as usize].positions(&self.vertices);
                    if overlaps_tri(&corners) {
                        found.push(value as usize);
                    }
                }
            }
        }

        if let Some(children) = node.children() {
            for child in children {
                self.volume_node(child, overlaps_bounds, overlaps_tri, seen, found);
            }
        }
    }
}
