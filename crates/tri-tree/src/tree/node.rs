//! Tree nodes.

use crate::{Aabb, Axis};

/// Index of a node in its tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A run of triangle indices in the arena's value pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueRange {
    pub(crate) start: u32,
    pub(crate) len: u32,
}

impl ValueRange {
    /// Number of triangle references in the run.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns `true` if the run is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Whether a node is a leaf or splits space in two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// No children; all geometry is in the node's value array.
    Leaf,
    /// Two children in consecutive arena slots, `first_child` holding
    /// geometry at or below the split plane and the next slot geometry at or
    /// above it.
    Internal {
        /// Axis the split plane is perpendicular to.
        axis: Axis,
        /// Arena slot of the low child; the high child follows it.
        first_child: NodeId,
    },
}

/// A node of the tree.
///
/// Every node has bounds enclosing all geometry in its subtree. Leaves keep
/// their triangles in a value array; internal nodes keep only the triangles
/// that straddled their split plane and were too large to clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    bounds: Aabb,
    split_location: f32,
    kind: NodeKind,
    values: ValueRange,
    value_bounds: Aabb,
}

impl Node {
    /// Slot filler for arena entries whose contents are not built yet.
    pub(crate) fn placeholder() -> Self {
        Self {
            bounds: Aabb::empty(),
            split_location: 0.0,
            kind: NodeKind::Leaf,
            values: ValueRange::default(),
            value_bounds: Aabb::empty(),
        }
    }

    pub(crate) fn leaf(bounds: Aabb, values: ValueRange, value_bounds: Aabb) -> Self {
        Self {
            bounds,
            split_location: 0.0,
            kind: NodeKind::Leaf,
            values,
            value_bounds,
        }
    }

    pub(crate) fn internal(
        bounds: Aabb,
        axis: Axis,
        split_location: f32,
        first_child: NodeId,
        values: ValueRange,
        value_bounds: Aabb,
    ) -> Self {
        Self {
            bounds,
            split_location,
            kind: NodeKind::Internal { axis, first_child },
            values,
            value_bounds,
        }
    }

    /// Returns the bounds of everything in this subtree.
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Returns the node kind.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Checks if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    /// Returns the split axis of an internal node.
    #[inline]
    pub fn split_axis(&self) -> Option<Axis> {
        match self.kind {
            NodeKind::Leaf => None,
            NodeKind::Internal { axis, .. } => Some(axis),
        }
    }

    /// Returns the split coordinate of an internal node.
    #[inline]
    pub fn split_location(&self) -> Option<f32> {
        match self.kind {
            NodeKind::Leaf => None,
            NodeKind::Internal { .. } => Some(self.split_location),
        }
    }

    /// Returns the low and high children of an internal node.
    #[inline]
    pub fn children(&self) -> Option<[NodeId; 2]> {
        match self.kind {
            NodeKind::Leaf => None,
            NodeKind::Internal { first_child, .. } => {
                Some([first_child, NodeId(first_child.0 + 1)])
            }
        }
    }

    /// Split axis, split coordinate and children of an internal node.
    #[inline]
    pub(crate) fn split(&self) -> Option<(Axis, f32, [NodeId; 2])> {
        match self.kind {
            NodeKind::Leaf => None,
            NodeKind::Internal { axis, first_child } => Some((
                axis,
                self.split_location,
                [first_child, NodeId(first_child.0 + 1)],
            )),
        }
    }

    /// Returns child `i` (0 = low, 1 = high) of an internal node.
    #[inline]
    pub fn child(&self, i: usize) -> Option<NodeId> {
        debug_assert!(i < 2, "a node has two children");
        self.children().map(|c| c[i])
    }

    /// Returns the run of triangle indices stored at this node.
    #[inline]
    pub fn values(&self) -> ValueRange {
        self.values
    }

    /// Returns the bounds of the geometry stored directly at this node.
    #[inline]
    pub fn value_bounds(&self) -> &Aabb {
        &self.value_bounds
    }
}
