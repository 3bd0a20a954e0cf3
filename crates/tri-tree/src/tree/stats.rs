//! Tree shape diagnostics.

use std::fmt;

use super::node::{Node, NodeId};
use super::visitor::NodeVisitor;

/// Shape statistics of a built tree.
///
/// Triangle counts are per reference: a triangle clipped into several
/// leaves is counted once per leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Triangle references over all value arrays.
    pub num_tris: usize,
    /// Number of nodes.
    pub num_nodes: usize,
    /// Number of leaves.
    pub num_leaves: usize,
    /// Depth of the deepest node; the root is at depth 0.
    pub depth: usize,
    /// Largest value array.
    pub largest_node: usize,
    /// Mean value count over leaves.
    pub average_values_per_leaf: f32,
    /// Depth of the shallowest leaf.
    pub shallowest_leaf: usize,
    /// Depth of the shallowest node holding more values than the threshold
    /// passed to [`TriTree::stats`](super::TriTree::stats), if any.
    pub shallowest_node_over_min: Option<usize>,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tris in {} nodes ({} leaves), depth {}, largest node {}, \
             {:.2} values/leaf, shallowest leaf at {}",
            self.num_tris,
            self.num_nodes,
            self.num_leaves,
            self.depth,
            self.largest_node,
            self.average_values_per_leaf,
            self.shallowest_leaf,
        )?;
        if let Some(depth) = self.shallowest_node_over_min {
            write!(f, ", first oversized node at {depth}")?;
        }
        Ok(())
    }
}

/// Accumulates [`Stats`] over a walk.
pub(crate) struct StatsVisitor {
    stats: Stats,
    values_per_node: usize,
    leaf_values: usize,
}

impl StatsVisitor {
    pub(crate) fn new(values_per_node: usize) -> Self {
        Self {
            stats: Stats {
                shallowest_leaf: usize::MAX,
                ..Stats::default()
            },
            values_per_node,
            leaf_values: 0,
        }
    }

    pub(crate) fn finish(mut self) -> Stats {
        if self.stats.num_leaves == 0 {
            return Stats::default();
        }
        self.stats.average_values_per_leaf =
            self.leaf_values as f32 / self.stats.num_leaves as f32;
        self.stats
    }
}

impl NodeVisitor for StatsVisitor {
    fn visit(&mut self, _id: NodeId, node: &Node, depth: usize, values: &[u32]) {
        let n = values.len();
        let s = &mut self.stats;
        s.num_tris += n;
        s.num_nodes += 1;
        s.depth = s.depth.max(depth);
        s.largest_node = s.largest_node.max(n);

        if n > self.values_per_node {
            s.shallowest_node_over_min =
                Some(s.shallowest_node_over_min.map_or(depth, |d| d.min(depth)));
        }

        if node.is_leaf() {
            s.num_leaves += 1;
            self.leaf_values += n;
            s.shallowest_leaf = s.shallowest_leaf.min(depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_nodes_gives_zeroed_stats() {
        let stats = StatsVisitor::new(5).finish();
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.shallowest_node_over_min, None);
    }

    #[test]
    fn accumulates_over_nodes() {
        let leaf = Node::placeholder();
        let mut visitor = StatsVisitor::new(2);
        visitor.visit(NodeId(0), &leaf, 1, &[0, 1, 2]);
        visitor.visit(NodeId(1), &leaf, 3, &[3]);

        let stats = visitor.finish();
        assert_eq!(stats.num_tris, 4);
        assert_eq!(stats.num_nodes, 2);
        assert_eq!(stats.num_leaves, 2);
        assert_eq!(stats.depth, 3);
        assert_eq!(stats.largest_node, 3);
        assert_eq!(stats.average_values_per_leaf, 2.0);
        assert_eq!(stats.shallowest_leaf, 1);
        assert_eq!(stats.shallowest_node_over_min, Some(1));
    }

    #[test]
    fn display_mentions_counts() {
        let stats = Stats {
            num_tris: 12,
            num_nodes: 3,
            num_leaves: 2,
            ..Stats::default()
        };
        let text = stats.to_string();
        assert!(text.starts_with("12 tris in 3 nodes (2 leaves)"));
        assert!(!text.contains("oversized"));
    }
}
