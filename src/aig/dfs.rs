//! Provides a DFS visitor yielding gates in dependency order.
//!
//! See [`Dfs`] for details.

use crate::{Aig, NodeId};

/// A post-order DFS visitor: every gate is yielded after all of its fanins.
///
/// You can:
/// - start a DFS from a node using [`from_node`]
/// - or visit all the AIG reachable from the outputs using [`from_outputs`].
///
/// In the latter case, it will start by the first output, then explore all
/// non-previously-explored nodes from the second output, and so on until all the outputs
/// have been processed. Outputs themselves are yielded right after their cone.
///
/// Visited gates are marked with a stamp taken from the [`Aig`] at creation.
/// Stamps only grow, so starting a new DFS never needs to clear previous marks.
/// Undefined gates have no fanin and are yielded as leaves.
///
/// [`from_node`]: Dfs::from_node
/// [`from_outputs`]: Dfs::from_outputs
///
/// Example:
///
/// ```rust
/// use fraig::{Aig, dfs::Dfs};
/// let mut aig = Aig::new();
/// // You can modify the aig here
/// let mut dfs = Dfs::from_outputs(&mut aig);
/// while let Some(id) = dfs.next(&mut aig) {
///     // You can still borrow mut aig here
///     // ...
/// }
/// ```
pub struct Dfs {
    /// Pending nodes, with a flag set once their fanins have been pushed.
    stack: Vec<(NodeId, bool)>,
    /// Roots still to explore, popped from the back.
    starts: Vec<NodeId>,
    stamp: u64,
}

impl Dfs {
    /// Create a DFS from the initial start node.
    /// You will only browse the fanin cone of this node.
    pub fn from_node(aig: &mut Aig, start: NodeId) -> Self {
        Dfs {
            stack: Vec::new(),
            starts: vec![start],
            stamp: aig.next_stamp(),
        }
    }

    /// Create a DFS from the outputs of the given AIG, in declaration order.
    pub fn from_outputs(aig: &mut Aig) -> Self {
        let mut starts = aig.get_outputs().to_vec();
        starts.reverse();
        Dfs {
            stack: Vec::new(),
            starts,
            stamp: aig.next_stamp(),
        }
    }

    /// Yield the next node of the DFS, or None if it is done.
    pub fn next(&mut self, aig: &mut Aig) -> Option<NodeId> {
        loop {
            while let Some((id, expanded)) = self.stack.pop() {
                if expanded {
                    return Some(id);
                }
                let Ok(node) = aig.node_mut(id) else {
                    continue;
                };
                if node.stamp == self.stamp {
                    continue;
                }
                node.stamp = self.stamp;
                self.stack.push((id, true));

                // Reversed so that fanin0 is explored first
                for fanin in node.get_fanins().iter().rev() {
                    if aig
                        .get_node(fanin.node)
                        .is_some_and(|n| n.stamp != self.stamp)
                    {
                        self.stack.push((fanin.node, false));
                    }
                }
            }

            // Maybe we can start from a different output?
            let start = self.starts.pop()?;
            self.stack.push((start, false));
        }
    }

    /// Returns true if `id` has been visited (or is being visited) by this DFS.
    pub fn visited(&self, aig: &Aig, id: NodeId) -> bool {
        aig.get_node(id).is_some_and(|n| n.stamp == self.stamp)
    }
}

impl Aig {
    /// All gates reachable from the outputs, each one after its fanins.
    pub fn dfs_order(&mut self) -> Vec<NodeId> {
        let mut dfs = Dfs::from_outputs(self);
        let mut order = Vec::new();
        while let Some(id) = dfs.next(self) {
            order.push(id);
        }
        order
    }

    /// The fanin cone of `id` (itself included), each one after its fanins.
    pub fn dfs_order_from(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut dfs = Dfs::from_node(self, id);
        let mut order = Vec::new();
        while let Some(id) = dfs.next(self) {
            order.push(id);
        }
        order
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{AigEdge, AigNodeKind};

    fn position(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|&x| x == id).unwrap()
    }

    #[test]
    fn from_node_test() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.new_and(2, AigEdge::new(0, false), AigEdge::new(1, false))
            .unwrap();

        let mut dfs = Dfs::from_node(&mut aig, 2);
        assert_eq!(dfs.next(&mut aig), Some(0)); // fanin0 first
        assert_eq!(dfs.next(&mut aig), Some(1));
        assert_eq!(dfs.next(&mut aig), Some(2));
        // Now there shouldn't be anything
        assert!(dfs.next(&mut aig).is_none());
        assert!(dfs.next(&mut aig).is_none());
    }

    #[test]
    fn from_outputs_test() {
        // i1, i3, a2 = 0 & i1, a4 = a2 & i3, outputs 5 = a2, 6 = !a4
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.new_and(2, AigEdge::new(0, false), AigEdge::new(1, false))
            .unwrap();
        aig.add_node(3, AigNodeKind::Input).unwrap();
        aig.new_and(4, AigEdge::new(2, false), AigEdge::new(3, false))
            .unwrap();
        aig.new_output(5, AigEdge::new(2, false)).unwrap();
        aig.new_output(6, AigEdge::new(4, true)).unwrap();

        let order = aig.dfs_order();
        assert_eq!(order, vec![0, 1, 2, 5, 3, 4, 6]);

        // Every gate after its fanins
        for &id in &order {
            for fanin in aig.node(id).unwrap().get_fanins() {
                assert!(position(&order, fanin.node) < position(&order, id));
            }
        }

        // A second traversal does not need any reset
        assert_eq!(aig.dfs_order(), order);
    }

    #[test]
    fn repeated_node() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.new_and(2, AigEdge::new(1, false), AigEdge::new(1, true))
            .unwrap();
        let mut dfs = Dfs::from_node(&mut aig, 2);
        assert_eq!(dfs.next(&mut aig), Some(1));
        assert_eq!(dfs.next(&mut aig), Some(2));
        assert!(dfs.visited(&aig, 1));
        assert!(!dfs.visited(&aig, 0));
        assert!(dfs.next(&mut aig).is_none());
    }

    #[test]
    fn unreachable_and_undefined() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.add_node(7, AigNodeKind::Undefined).unwrap();
        aig.new_and(2, AigEdge::new(7, false), AigEdge::new(1, false))
            .unwrap();
        aig.new_and(3, AigEdge::new(1, false), AigEdge::new(1, false))
            .unwrap();
        aig.new_output(8, AigEdge::new(2, true)).unwrap();
        assert_eq!(aig.dfs_order(), vec![7, 1, 2, 8]);
    }
}
