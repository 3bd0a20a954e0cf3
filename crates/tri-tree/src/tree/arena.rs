//! Arena owning every node and leaf value array of one tree.
//!
//! Nodes are addressed by [`NodeId`] and value arrays by [`ValueRange`], so
//! nothing holds a pointer into the arena. Discarding a tree drops the arena
//! and frees all of its storage at once.

use crate::poly::Poly;
use crate::{Aabb, Result, TreeError};

use super::node::{Node, NodeId, ValueRange};

#[derive(Debug, Clone, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    values: Vec<u32>,
}

impl NodeArena {
    /// Reserves a single slot, used for the root.
    pub(crate) fn alloc_node(&mut self) -> Result<NodeId> {
        self.nodes.try_reserve(1)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::placeholder());
        Ok(id)
    }

    /// Reserves two consecutive slots and returns the first.
    pub(crate) fn alloc_pair(&mut self) -> Result<NodeId> {
        self.nodes.try_reserve(2)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::placeholder());
        self.nodes.push(Node::placeholder());
        Ok(id)
    }

    /// Copies the source triangle of each poly into the value pool.
    ///
    /// Returns the stored run and the union of the polys' bounds.
    pub(crate) fn alloc_values(&mut self, polys: &[Poly]) -> Result<(ValueRange, Aabb)> {
        if polys.is_empty() {
            return Ok((ValueRange::default(), Aabb::empty()));
        }
        self.values.try_reserve(polys.len())?;

        let start = u32::try_from(self.values.len())
            .map_err(|_| TreeError::TooManyTriangles(self.values.len()))?;
        let len = u32::try_from(polys.len()).map_err(|_| TreeError::TooManyTriangles(polys.len()))?;
        start
            .checked_add(len)
            .ok_or(TreeError::TooManyTriangles(self.values.len() + polys.len()))?;

        self.values.extend(polys.iter().map(Poly::source));
        Ok((ValueRange { start, len }, Poly::compute_bounds(polys)))
    }

    /// Fills a reserved slot.
    pub(crate) fn set(&mut self, id: NodeId, node: Node) {
        self.nodes[id.0] = node;
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub(crate) fn values(&self, range: ValueRange) -> &[u32] {
        let start = range.start as usize;
        &self.values[start..start + range.len as usize]
    }

    /// Number of allocated nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of triangle references across all value arrays.
    #[inline]
    pub(crate) fn value_count(&self) -> usize {
        self.values.len()
    }
}
