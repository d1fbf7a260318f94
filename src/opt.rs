//! Peephole simplification of AND gates, and removal of the gates no output depends on.

use log::{debug, info};

use crate::{Aig, AigEdge, AigNodeKind, NodeId, Result, dfs::Dfs};

/// What an AND gate reading `fanin0` and `fanin1` can be replaced by, if anything.
///
/// - `a & a` is `a`
/// - `a & !a` is `0`
/// - `a & 0` is `0`
/// - `a & 1` is `a`
fn simplify(fanin0: AigEdge, fanin1: AigEdge) -> Option<AigEdge> {
    let zero = AigEdge::new(0, false);
    if fanin0 == fanin1 {
        Some(fanin0)
    } else if fanin0.is_complement_of(&fanin1) || fanin0.is_cst_false() || fanin1.is_cst_false() {
        Some(zero)
    } else if fanin0.is_cst_true() {
        Some(fanin1)
    } else if fanin1.is_cst_true() {
        Some(fanin0)
    } else {
        None
    }
}

impl Aig {
    /// Simplifies every reachable AND gate once, in dependency order. Returns the number of
    /// gates replaced.
    ///
    /// A gate is replaced by merging it into the edge it simplifies to, so its consumers
    /// inherit the polarity of that edge. Since fanins come first, a replacement can enable
    /// another one further in the same pass (`(a & !a) & b` becomes `0`).
    /// Undefined gates nobody reads anymore are deleted afterwards.
    pub fn optimize(&mut self) -> Result<usize> {
        let mut simplified = 0;

        for id in self.dfs_order() {
            let Some(node) = self.get_node(id) else {
                continue;
            };
            let &AigNodeKind::And { fanin0, fanin1 } = node.get_kind() else {
                continue;
            };
            if let Some(edge) = simplify(fanin0, fanin1) {
                debug!("optimize: {} ({} & {}) replaced by {}", id, fanin0, fanin1, edge);
                self.merge_in_order(edge.node, id, edge.complement)?;
                simplified += 1;
            }
        }

        let dangling: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.is_undefined() && n.get_fanouts().is_empty())
            .map(|n| n.get_id())
            .collect();
        for id in dangling {
            self.remove(id)?;
        }

        info!("optimize: {} gates simplified", simplified);
        Ok(simplified)
    }

    /// Removes every AND and undefined gate unreachable from the outputs. Returns the number of
    /// gates removed.
    ///
    /// Inputs and the constant are always kept.
    pub fn sweep(&mut self) -> Result<usize> {
        let mut dfs = Dfs::from_outputs(self);
        while dfs.next(self).is_some() {}

        let sweepable = |aig: &Aig, id: NodeId| {
            aig.get_node(id).is_some_and(|n| {
                (n.is_and() || n.is_undefined()) && n.get_fanouts().is_empty()
            }) && !dfs.visited(aig, id)
        };

        // Unreachable gates only feed unreachable gates, so they are freed from the top down
        let mut stack: Vec<NodeId> = self
            .nodes()
            .map(|n| n.get_id())
            .filter(|&id| sweepable(self, id))
            .collect();
        let mut removed = 0;

        while let Some(id) = stack.pop() {
            // Already removed, when read twice by the same gate
            let Some(node) = self.get_node(id) else {
                continue;
            };
            let fanins = node.get_fanins();
            debug!("sweep: removing {} {}", node.get_kind(), id);
            self.remove(id)?;
            removed += 1;
            stack.extend(
                fanins
                    .into_iter()
                    .map(|f| f.node)
                    .filter(|&fanin| sweepable(self, fanin)),
            );
        }

        info!("sweep: {} gates removed", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::testutil::{random_aig, truth_tables};

    #[test]
    fn simplify_test() {
        let a = AigEdge::new(3, false);
        let b = AigEdge::new(4, true);
        let zero = AigEdge::new(0, false);
        assert_eq!(simplify(a, a), Some(a));
        assert_eq!(simplify(a, !a), Some(zero));
        assert_eq!(simplify(zero, b), Some(zero));
        assert_eq!(simplify(b, zero), Some(zero));
        assert_eq!(simplify(!zero, b), Some(b));
        assert_eq!(simplify(a, !zero), Some(a));
        assert_eq!(simplify(!zero, !zero), Some(!zero));
        assert_eq!(simplify(a, b), None);
    }

    #[test]
    fn contradiction_becomes_constant() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.add_node(2, AigNodeKind::Input).unwrap();
        // 3 = i1 & !i1, 4 = !3 & i2
        aig.new_and(3, AigEdge::new(1, false), AigEdge::new(1, true))
            .unwrap();
        aig.new_and(4, AigEdge::new(3, true), AigEdge::new(2, false))
            .unwrap();
        aig.new_output(5, AigEdge::new(4, false)).unwrap();
        aig.new_output(6, AigEdge::new(3, true)).unwrap();

        assert_eq!(aig.optimize().unwrap(), 2);
        aig.check_integrity().unwrap();
        assert_eq!(aig.num_ands(), 0);
        assert_eq!(
            aig.get_output_edges().unwrap(),
            vec![AigEdge::new(2, false), AigEdge::new(0, true)]
        );
        assert!(aig.node(1).unwrap().get_fanouts().is_empty());
    }

    #[test]
    fn optimize_redundant_test() {
        let mut aig = Aig::from_file("assets/circuits/redundant.aag").unwrap();
        // Only 9 = !a & a
        assert_eq!(aig.optimize().unwrap(), 1);
        assert_eq!(aig.get_output_edges().unwrap()[1], AigEdge::new(0, false));

        // 8 = 6 & 6 once strashed
        aig.strash().unwrap();
        assert_eq!(aig.optimize().unwrap(), 1);
        aig.check_integrity().unwrap();
        assert_eq!(aig.num_ands(), 2);
        assert_eq!(aig.get_output_edges().unwrap()[0], AigEdge::new(6, false));
    }

    #[test]
    fn optimize_removes_dangling_undefined() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.add_node(2, AigNodeKind::Undefined).unwrap();
        // 3 = und & 0
        aig.new_and(3, AigEdge::new(2, false), AigEdge::new(0, false))
            .unwrap();
        aig.new_and(4, AigEdge::new(3, true), AigEdge::new(1, false))
            .unwrap();
        aig.new_output(5, AigEdge::new(4, false)).unwrap();

        assert_eq!(aig.optimize().unwrap(), 2);
        aig.check_integrity().unwrap();
        assert!(aig.get_node(2).is_none());
        assert_eq!(aig.get_output_edges().unwrap(), vec![AigEdge::new(1, false)]);
    }

    #[test]
    fn sweep_undefined_test() {
        let mut aig = Aig::from_file("assets/circuits/undefined.aag").unwrap();
        assert_eq!(aig.sweep().unwrap(), 1);
        aig.check_integrity().unwrap();
        assert!(aig.get_node(6).is_none());
        // Still read by 5
        assert!(aig.node(7).unwrap().is_undefined());
        assert_eq!(aig.sweep().unwrap(), 0);
    }

    #[test]
    fn sweep_chain_test() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.add_node(2, AigNodeKind::Input).unwrap();
        aig.new_and(3, AigEdge::new(1, false), AigEdge::new(2, false))
            .unwrap();
        aig.new_and(4, AigEdge::new(3, false), AigEdge::new(1, true))
            .unwrap();
        aig.add_node(7, AigNodeKind::Undefined).unwrap();
        aig.new_and(5, AigEdge::new(4, false), AigEdge::new(7, false))
            .unwrap();
        aig.new_and(6, AigEdge::new(4, true), AigEdge::new(4, true))
            .unwrap();
        aig.new_output(8, AigEdge::new(3, false)).unwrap();

        assert_eq!(aig.sweep().unwrap(), 4);
        aig.check_integrity().unwrap();
        for id in [4, 5, 6, 7] {
            assert!(aig.get_node(id).is_none());
        }
        assert_eq!(aig.num_ands(), 1);
        assert_eq!(aig.num_inputs(), 2);
    }

    #[test]
    fn random_optimize_and_sweep_are_sound() {
        for seed in 0..20 {
            let mut aig = random_aig(seed, 5, 40, 4);
            let before = truth_tables(&mut aig);

            aig.optimize().unwrap();
            aig.check_integrity().unwrap();
            assert_eq!(truth_tables(&mut aig), before);

            aig.sweep().unwrap();
            aig.check_integrity().unwrap();
            assert_eq!(truth_tables(&mut aig), before);
            let reachable = aig
                .dfs_order()
                .into_iter()
                .filter(|&id| aig.node(id).unwrap().is_and())
                .count();
            assert_eq!(aig.num_ands(), reachable);
        }
    }
}
