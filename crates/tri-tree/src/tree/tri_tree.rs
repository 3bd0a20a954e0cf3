//! Tree container: triangle storage, lifecycle and diagnostics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use nalgebra::Point3;
use tracing::{debug, info};

use crate::intersect::Hit;
use crate::poly::Poly;
use crate::tri::check_indices;
use crate::{Result, Tri, TreeError, VertexBuffer};

use super::arena::NodeArena;
use super::build::build_node;
use super::node::{Node, NodeId, NodeKind};
use super::settings::Settings;
use super::stats::{Stats, StatsVisitor};
use super::visitor::{FnVisitor, NodeVisitor};

/// Triangles with an area at or below this are left out of the tree.
pub const MIN_TRI_AREA: f32 = 1e-6;

/// A bounding-volume hierarchy over a triangle soup.
///
/// Triangles index into a shared [`VertexBuffer`]. The hierarchy is built by
/// [`rebuild`](Self::rebuild) (or implicitly by
/// [`set_contents`](Self::set_contents)) and is immutable afterwards, so any
/// number of threads may query one tree concurrently.
///
/// # Example
///
/// ```
/// use nalgebra::{Point3, Vector3};
/// use tri_tree::{IntersectRayOptions, Ray, Settings, TriTree, VertexBuffer};
///
/// let vertices = VertexBuffer::from_positions([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ]);
/// let tree = TriTree::from_mesh(vertices, &[[0, 1, 2]], Settings::default()).unwrap();
///
/// let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::new(0.0, 0.0, -1.0));
/// let hit = tree.intersect_ray(&ray, IntersectRayOptions::empty()).unwrap();
/// assert_eq!(hit.tri_index, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TriTree {
    pub(super) settings: Settings,
    pub(super) vertices: Arc<VertexBuffer>,
    pub(super) tris: Vec<Tri>,
    pub(super) arena: NodeArena,
    pub(super) root: Option<NodeId>,
    last_build_duration: Option<Duration>,
}

impl TriTree {
    /// Creates an empty tree with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with the given settings.
    pub fn with_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    /// Builds a tree over an indexed triangle list.
    pub fn from_mesh(
        vertices: VertexBuffer,
        indices: &[[u32; 3]],
        settings: Settings,
    ) -> Result<Self> {
        let tris = indices
            .iter()
            .map(|&i| Tri::new(&vertices, i))
            .collect::<Result<Vec<_>>>()?;
        let mut tree = Self::with_settings(settings)?;
        tree.set_contents(Arc::new(vertices), tris)?;
        Ok(tree)
    }

    /// Returns the build settings.
    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the build settings. Takes effect on the next
    /// [`rebuild`](Self::rebuild).
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Replaces the triangles and vertex buffer, then rebuilds.
    ///
    /// Fails without touching the tree if any triangle names a vertex outside
    /// `vertices`.
    pub fn set_contents(&mut self, vertices: Arc<VertexBuffer>, tris: Vec<Tri>) -> Result<()> {
        for tri in &tris {
            check_indices(&vertices, &tri.indices())?;
        }
        if u32::try_from(tris.len()).is_err() {
            return Err(TreeError::TooManyTriangles(tris.len()));
        }
        self.vertices = vertices;
        self.tris = tris;
        self.rebuild()
    }

    /// Discards any previous hierarchy and builds a new one from the current
    /// triangles.
    ///
    /// Triangles with area at most [`MIN_TRI_AREA`] are skipped. The result
    /// depends only on the triangles and settings, so calling this
    /// repeatedly yields the same tree. On failure the tree is left empty.
    #[tracing::instrument(skip_all, fields(tri_count = self.tris.len()))]
    pub fn rebuild(&mut self) -> Result<()> {
        let start = Instant::now();
        self.arena = NodeArena::default();
        self.root = None;
        self.last_build_duration = None;

        self.settings.validate()?;

        let mut polys: Vec<Poly> = Vec::new();
        polys.try_reserve(self.tris.len())?;
        for (i, tri) in self.tris.iter().enumerate() {
            if tri.area() > MIN_TRI_AREA {
                let source =
                    u32::try_from(i).map_err(|_| TreeError::TooManyTriangles(self.tris.len()))?;
                polys.push(Poly::new(source, tri, &self.vertices));
            }
        }

        let excluded = self.tris.len() - polys.len();
        if excluded > 0 {
            debug!(excluded, "skipped zero-area triangles");
        }

        if !polys.is_empty() {
            let mut arena = NodeArena::default();
            let root = arena.alloc_node()?;
            build_node(&mut arena, root, polys, &self.settings)?;
            self.arena = arena;
            self.root = Some(root);
        }

        let elapsed = start.elapsed();
        self.last_build_duration = Some(elapsed);

        let stats = self.stats(self.settings.values_per_leaf);
        info!(
            algorithm = %self.settings.algorithm,
            nodes = stats.num_nodes,
            depth = stats.depth,
            references = self.arena.value_count(),
            ?elapsed,
            "built tree"
        );

        debug_assert!(self.validate(), "tree invariants violated after build");
        Ok(())
    }

    /// Discards the triangles and the hierarchy. Settings are kept.
    pub fn clear(&mut self) {
        self.arena = NodeArena::default();
        self.root = None;
        self.tris.clear();
        self.vertices = Arc::default();
        self.last_build_duration = None;
    }

    /// Returns `true` if no hierarchy is built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of triangles supplied, including any excluded from the build.
    #[inline]
    pub fn size(&self) -> usize {
        self.tris.len()
    }

    /// Returns the triangles.
    #[inline]
    pub fn tris(&self) -> &[Tri] {
        &self.tris
    }

    /// Returns triangle `index`, if it exists.
    #[inline]
    pub fn tri(&self, index: usize) -> Option<&Tri> {
        self.tris.get(index)
    }

    /// Returns the shared vertex buffer.
    #[inline]
    pub fn vertex_buffer(&self) -> &Arc<VertexBuffer> {
        &self.vertices
    }

    /// Returns the root node id, if a hierarchy is built.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns node `id`.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree's current hierarchy.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.node(id)
    }

    /// Returns the triangle indices stored directly at `node`.
    #[inline]
    pub fn values(&self, node: &Node) -> &[u32] {
        self.arena.values(node.values())
    }

    /// How long the last successful build took.
    #[inline]
    pub fn last_build_duration(&self) -> Option<Duration> {
        self.last_build_duration
    }

    /// Interpolates the world-space position of a hit.
    ///
    /// # Panics
    /// Panics if the hit did not come from this tree.
    pub fn hit_position(&self, hit: &Hit) -> Point3<f32> {
        self.tris[hit.tri_index].position_at(&self.vertices, hit.u, hit.v)
    }

    /// Walks every node depth-first, low child before high child.
    pub fn walk<V: NodeVisitor>(&self, visitor: &mut V) {
        if let Some(root) = self.root {
            self.walk_node(root, 0, visitor);
        }
    }

    fn walk_node<V: NodeVisitor>(&self, id: NodeId, depth: usize, visitor: &mut V) {
        let node = self.arena.node(id);
        visitor.visit(id, node, depth, self.values(node));
        if let Some(children) = node.children() {
            for child in children {
                self.walk_node(child, depth + 1, visitor);
            }
        }
    }

    /// Computes shape statistics. Nodes holding more than `values_per_node`
    /// triangles count as oversized.
    pub fn stats(&self, values_per_node: usize) -> Stats {
        let mut visitor = StatsVisitor::new(values_per_node);
        self.walk(&mut visitor);
        visitor.finish()
    }

    /// Checks the structural invariants of the hierarchy:
    /// - child slots lie inside the arena
    /// - every node's bounds contain its children's bounds and its own value
    ///   bounds
    /// - every triangle stored at a node overlaps that node's value bounds
    /// - every triangle above [`MIN_TRI_AREA`] is referenced at least once
    pub fn validate(&self) -> bool {
        let Some(root) = self.root else {
            return self.arena.len() == 0;
        };
        if root.0 >= self.arena.len() {
            return false;
        }

        let mut referenced = vec![false; self.tris.len()];
        let mut ok = true;
        let node_count = self.arena.len();
        self.walk(&mut FnVisitor::new(|_, node: &Node, _, values: &[u32]| {
            if !node.bounds().contains(node.value_bounds()) {
                ok = false;
            }
            for &v in values {
                match referenced.get_mut(v as usize) {
                    Some(seen) => *seen = true,
                    None => {
                        ok = false;
                        continue;
                    }
                }
                // Stored fragments lie inside their source triangle's bounds.
                let tri_bounds = self.tris[v as usize].bounds(&self.vertices);
                if !tri_bounds.intersects(node.value_bounds()) {
                    ok = false;
                }
            }
            if let Some([low, high]) = node.children() {
                if high.0 >= node_count {
                    ok = false;
                    return;
                }
                for child in [low, high] {
                    if !node.bounds().contains(self.arena.node(child).bounds()) {
                        ok = false;
                    }
                }
            }
        }));

        ok && self
            .tris
            .iter()
            .zip(&referenced)
            .all(|(tri, &seen)| seen || tri.area() <= MIN_TRI_AREA)
    }

    /// Renders an indented outline of the hierarchy, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.walk(&mut FnVisitor::new(
            |id: NodeId, node: &Node, depth: usize, values: &[u32]| {
                let (low, high) = (node.bounds().low(), node.bounds().high());
                out.push_str(&format!(
                    "{}#{} [{:.3}, {:.3}, {:.3}]..[{:.3}, {:.3}, {:.3}]",
                    "  ".repeat(depth),
                    id.index(),
                    low.x,
                    low.y,
                    low.z,
                    high.x,
                    high.y,
                    high.z,
                ));
                if let (NodeKind::Internal { axis, .. }, Some(location)) =
                    (node.kind(), node.split_location())
                {
                    out.push_str(&format!(" split {axis} at {location:.3}"));
                }
                out.push_str(&format!(" N = {}\n", values.len()));
            },
        ));
        out
    }
}
