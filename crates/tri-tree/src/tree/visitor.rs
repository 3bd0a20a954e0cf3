//! Visitor pattern for walking the nodes of a tree.
//!
//! Walks are depth-first and pre-order, low child before high child.

use super::node::{Node, NodeId};

/// Visitor for processing nodes during a tree walk.
pub trait NodeVisitor {
    /// Called once per node.
    ///
    /// `depth` is 0 at the root and `values` holds the triangle indices stored
    /// directly at the node.
    fn visit(&mut self, id: NodeId, node: &Node, depth: usize, values: &[u32]);
}

/// A visitor that calls a closure for each node.
pub struct FnVisitor<F>
where
    F: FnMut(NodeId, &Node, usize, &[u32]),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(NodeId, &Node, usize, &[u32]),
{
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> NodeVisitor for FnVisitor<F>
where
    F: FnMut(NodeId, &Node, usize, &[u32]),
{
    fn visit(&mut self, id: NodeId, node: &Node, depth: usize, values: &[u32]) {
        (self.func)(id, node, depth, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_visitor_calls_closure() {
        let mut count = 0;
        {
            let mut visitor = FnVisitor::new(|_: NodeId, _: &Node, _: usize, values: &[u32]| {
                count += values.len();
            });
            let node = Node::placeholder();
            visitor.visit(NodeId(0), &node, 0, &[1, 2]);
            visitor.visit(NodeId(1), &node, 1, &[3]);
        }
        assert_eq!(count, 3);
    }
}
