//! Functional reduction: candidate classes found by simulation are checked with a SAT solver,
//! and proved equivalences are merged.
//!
//! ```rust
//! use fraig::{Aig, fraig::FraigConfig, sim::SimConfig};
//!
//! let mut aig = Aig::from_file("assets/circuits/redundant.aag").unwrap();
//! let report = aig
//!     .fraig_reduce(&SimConfig::default().with_seed(7), &FraigConfig::default())
//!     .unwrap();
//! assert!(report.proved > 0);
//! assert_eq!(aig.num_ands(), 2);
//! ```

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::{debug, info};

use crate::{
    Aig, AigError, AigNodeKind, NodeId, Result,
    sat::{ProofService, SatOutcome, SatVar, VarisatService},
    sim::SimConfig,
};

/// Time ceilings of a proof pass, measured from its start.
#[derive(Debug, Clone)]
pub struct FraigConfig {
    /// AND-gate classes are skipped if this is exceeded once the constant class is done.
    pub skip_after: Duration,
    /// No proof is started after this.
    pub stop_after: Duration,
}

impl FraigConfig {
    pub fn with_skip_after(mut self, skip_after: Duration) -> Self {
        self.skip_after = skip_after;
        self
    }

    pub fn with_stop_after(mut self, stop_after: Duration) -> Self {
        self.stop_after = stop_after;
        self
    }
}

impl Default for FraigConfig {
    fn default() -> Self {
        FraigConfig {
            skip_after: Duration::from_secs(120),
            stop_after: Duration::from_secs(150),
        }
    }
}

/// What a proof pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FraigReport {
    /// Candidates proved equivalent to their representative, and merged.
    pub proved: usize,
    /// Candidates with a counter-example.
    pub disproved: usize,
    /// Candidates left unchecked (time ceilings, or not part of the circuit anymore).
    pub unresolved: usize,
    /// Gates removed by the sweep following the merges.
    pub swept: usize,
    /// Gates merged by the structural hashing following the sweep.
    pub strashed: usize,
}

/// The circuit as clauses, plus the variables held false in every proof.
struct ProofModel<'a, S: ProofService> {
    solver: &'a mut S,
    /// The constant and undefined gates.
    grounded: Vec<SatVar>,
}

impl<S: ProofService> ProofModel<'_, S> {
    /// Is `b ^ inverted` equivalent to `a`?
    fn prove(&mut self, a: SatVar, b: SatVar, inverted: bool) -> Result<SatOutcome> {
        let miter = self.solver.new_variable();
        self.solver.assert_xor(miter, a, false, b, inverted);
        self.solver.release_assumptions();
        for &var in &self.grounded {
            self.solver.assume_value(var, false);
        }
        self.solver.assume_value(miter, true);
        self.solver.solve_under_assumptions()
    }
}

impl Aig {
    fn var(&self, id: NodeId) -> Result<SatVar> {
        self.node(id)?.var.ok_or_else(|| {
            AigError::ConsistencyViolation(format!("gate {} has no solver variable", id))
        })
    }

    /// Gives a variable to the constant and to every gate reachable from the outputs, and
    /// pushes the clauses of the AND gates. Returns the dependency order used.
    fn build_proof_model<'a, S: ProofService>(
        &mut self,
        solver: &'a mut S,
    ) -> Result<(ProofModel<'a, S>, Vec<NodeId>)> {
        let order = self.dfs_order();
        let zero = solver.new_variable();
        self.node_mut(0)?.var = Some(zero);
        let mut grounded = vec![zero];

        for &id in &order {
            let node = self.node(id)?;
            if node.is_false() || node.is_output() {
                continue;
            }
            let kind = node.get_kind().clone();
            let var = solver.new_variable();
            self.node_mut(id)?.var = Some(var);
            match kind {
                AigNodeKind::And { fanin0, fanin1 } => {
                    let (in0, in1) = (self.var(fanin0.node)?, self.var(fanin1.node)?);
                    solver.assert_and_gate(var, in0, fanin0.complement, in1, fanin1.complement);
                }
                // Undefined nets are taken as constant 0, as in simulation
                AigNodeKind::Undefined => grounded.push(var),
                _ => (),
            }
        }

        Ok((ProofModel { solver, grounded }, order))
    }

    /// Checks every candidate against the first member of its class and merges the proved ones.
    ///
    /// The class holding the constant goes first, the constant being its representative.
    /// Other representatives are the members coming first in dependency order, so that
    /// merging a member into its representative can never create a cycle.
    /// A disproved member is not tried against the other members of its class.
    ///
    /// Merges are applied once all proofs are done, then the candidate partition is dropped
    /// and the circuit is swept and strashed.
    pub fn fraig_with<S: ProofService>(
        &mut self,
        config: &FraigConfig,
        solver: &mut S,
    ) -> Result<FraigReport> {
        let start = Instant::now();
        let mut classes = self
            .get_partition()
            .map(|p| p.classes().to_vec())
            .unwrap_or_default();
        let (mut model, order) = self.build_proof_model(solver)?;

        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(k, &id)| (id, k + 1)).collect();
        let rank = |id: NodeId| {
            if id == 0 {
                0
            } else {
                position.get(&id).copied().unwrap_or(usize::MAX)
            }
        };
        for class in &mut classes {
            class.sort_by_key(|&id| rank(id));
        }
        classes.sort_by_key(|class| class.first().is_some_and(|&id| id != 0));

        let mut report = FraigReport::default();
        let mut merges: Vec<(NodeId, NodeId, bool)> = Vec::new();
        let mut stopped = false;

        for class in &classes {
            let Some((&rep, members)) = class.split_first() else {
                continue;
            };
            if !stopped && rep != 0 && start.elapsed() >= config.skip_after {
                debug!("fraig: out of time, skipping the remaining classes");
                stopped = true;
            }
            for &member in members {
                if !stopped && start.elapsed() >= config.stop_after {
                    debug!("fraig: out of time, stopping");
                    stopped = true;
                }
                let (Some(a), Some(b)) = (self.node(rep)?.var, self.node(member)?.var) else {
                    report.unresolved += 1;
                    continue;
                };
                if stopped {
                    report.unresolved += 1;
                    continue;
                }

                let inverted = self.node(rep)?.pattern == !self.node(member)?.pattern;
                match model.prove(a, b, inverted)? {
                    SatOutcome::Unsat => {
                        debug!(
                            "fraig: {} is {}{}",
                            member,
                            if inverted { "!" } else { "" },
                            rep
                        );
                        merges.push((rep, member, inverted));
                        report.proved += 1;
                    }
                    SatOutcome::Sat => {
                        debug!("fraig: {} and {} differ", rep, member);
                        report.disproved += 1;
                    }
                }
            }
        }

        for (keep, drop, inverted) in merges {
            self.merge_in_order(keep, drop, inverted)?;
        }
        self.reset_partition();
        for node in self.nodes_mut() {
            node.var = None;
        }
        report.swept = self.sweep()?;
        report.strashed = self.strash()?;

        info!(
            "fraig: {} proved, {} disproved, {} unresolved",
            report.proved, report.disproved, report.unresolved
        );
        Ok(report)
    }

    /// [`Aig::fraig_with`] using a fresh [`VarisatService`].
    pub fn fraig(&mut self, config: &FraigConfig) -> Result<FraigReport> {
        self.fraig_with(config, &mut VarisatService::new())
    }

    /// Random simulation to build candidate classes (see [`Aig::random_sim`]), then
    /// [`Aig::fraig`].
    pub fn fraig_reduce(
        &mut self,
        sim_config: &SimConfig,
        fraig_config: &FraigConfig,
    ) -> Result<FraigReport> {
        self.random_sim(sim_config, None)?;
        self.fraig(fraig_config)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::{
        AigEdge,
        testutil::{random_aig, truth_tables},
    };

    /// Never proves anything.
    #[derive(Default)]
    struct Refuter {
        vars: usize,
        solves: usize,
    }

    impl ProofService for Refuter {
        fn new_variable(&mut self) -> SatVar {
            self.vars += 1;
            SatVar(self.vars - 1)
        }
        fn assert_and_gate(&mut self, _: SatVar, _: SatVar, _: bool, _: SatVar, _: bool) {}
        fn assert_xor(&mut self, _: SatVar, _: SatVar, _: bool, _: SatVar, _: bool) {}
        fn assume_value(&mut self, _: SatVar, _: bool) {}
        fn release_assumptions(&mut self) {}
        fn solve_under_assumptions(&mut self) -> Result<SatOutcome> {
            self.solves += 1;
            Ok(SatOutcome::Sat)
        }
    }

    fn redundant_classes() -> Aig {
        let mut aig = Aig::from_file("assets/circuits/redundant.aag").unwrap();
        let config = SimConfig::default().with_seed(42).with_stall(8, 1);
        aig.random_sim(&config, None).unwrap();
        assert_eq!(
            aig.get_partition().unwrap().classes(),
            &[vec![0, 9], vec![4, 5], vec![6, 7, 8]]
        );
        aig
    }

    #[test]
    fn associativity_test() {
        let mut aig = Aig::new();
        for id in 1..=3 {
            aig.add_node(id, AigNodeKind::Input).unwrap();
        }
        let e = |id| AigEdge::new(id, false);
        // (a & b) & c and a & (b & c)
        aig.new_and(4, e(1), e(2)).unwrap();
        aig.new_and(5, e(4), e(3)).unwrap();
        aig.new_and(6, e(2), e(3)).unwrap();
        aig.new_and(7, e(1), e(6)).unwrap();
        aig.new_output(8, e(5)).unwrap();
        aig.new_output(9, e(7)).unwrap();

        aig.random_sim(&SimConfig::default().with_seed(42).with_max_rounds(2), None)
            .unwrap();
        let fec = aig.node(5).unwrap().get_fec();
        assert!(fec.is_some());
        assert_eq!(aig.node(7).unwrap().get_fec(), fec);

        let report = aig.fraig(&FraigConfig::default()).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(report.proved, 1);
        assert_eq!(report.disproved, 0);
        // b & c is not used anymore
        assert_eq!(report.swept, 1);
        assert_eq!(aig.get_output_edges().unwrap(), vec![e(5), e(5)]);
        assert_eq!(aig.num_ands(), 2);
        assert!(aig.get_partition().is_none());
        assert!(aig.nodes().all(|n| n.get_var().is_none()));
    }

    #[test]
    fn inverted_pair_test() {
        let mut aig = Aig::new();
        aig.add_node(1, AigNodeKind::Input).unwrap();
        aig.add_node(2, AigNodeKind::Input).unwrap();
        aig.new_and(3, AigEdge::new(1, false), AigEdge::new(2, false))
            .unwrap();
        // !(a & b) & !(a & b)
        aig.new_and(4, AigEdge::new(3, true), AigEdge::new(3, true))
            .unwrap();
        aig.new_output(5, AigEdge::new(3, false)).unwrap();
        aig.new_output(6, AigEdge::new(4, false)).unwrap();

        aig.file_sim("00\n01\n10\n11\n".as_bytes(), None).unwrap();
        assert_eq!(aig.get_partition().unwrap().classes(), &[vec![3, 4]]);

        let report = aig.fraig(&FraigConfig::default()).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(report.proved, 1);
        assert_eq!(
            aig.get_output_edges().unwrap(),
            vec![AigEdge::new(3, false), AigEdge::new(3, true)]
        );
        assert_eq!(aig.num_ands(), 1);
    }

    #[test]
    fn constant_class_test() {
        let mut aig = Aig::from_file("assets/circuits/redundant.aag").unwrap();
        // A single assignment: every gate is 0
        aig.file_sim("000\n".as_bytes(), None).unwrap();
        assert_eq!(aig.get_partition().unwrap().len(), 1);

        let report = aig.fraig(&FraigConfig::default()).unwrap();
        aig.check_integrity().unwrap();
        // Only !a & a is really 0
        assert_eq!(report.proved, 1);
        assert_eq!(report.disproved, 5);
        assert_eq!(report.strashed, 2);
        assert_eq!(aig.get_output_edges().unwrap()[1], AigEdge::new(0, false));
        assert_eq!(aig.num_ands(), 3);
    }

    #[test]
    fn redundant_test() {
        let mut aig = redundant_classes();
        let report = aig.fraig(&FraigConfig::default()).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(
            report,
            FraigReport {
                proved: 4,
                disproved: 0,
                unresolved: 0,
                swept: 0,
                strashed: 0,
            }
        );
        assert_eq!(
            aig.get_output_edges().unwrap(),
            vec![AigEdge::new(6, false), AigEdge::new(0, false)]
        );
        assert_eq!(aig.num_ands(), 2);
    }

    #[test]
    fn time_ceilings_test() {
        // The constant class is still handled
        let mut aig = redundant_classes();
        let config = FraigConfig::default().with_skip_after(Duration::ZERO);
        let report = aig.fraig(&config).unwrap();
        aig.check_integrity().unwrap();
        assert_eq!(report.proved, 1);
        assert_eq!(report.unresolved, 3);
        assert_eq!(report.strashed, 2);

        // Nothing is tried
        let mut aig = redundant_classes();
        let config = FraigConfig::default().with_stop_after(Duration::ZERO);
        let report = aig.fraig(&config).unwrap();
        assert_eq!(report.proved + report.disproved, 0);
        assert_eq!(report.unresolved, 4);
        assert_eq!(aig.num_ands(), 4);
    }

    #[test]
    fn refuted_candidates_are_kept() {
        let mut aig = redundant_classes();
        let mut refuter = Refuter::default();
        let report = aig
            .fraig_with(&FraigConfig::default(), &mut refuter)
            .unwrap();
        assert_eq!(report.disproved, 4);
        assert_eq!(refuter.solves, 4);
        // Constant, 3 inputs, 6 AND gates, 4 miters
        assert_eq!(refuter.vars, 14);
        // Only strash
        assert_eq!(aig.num_ands(), 4);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn no_partition_test() {
        let mut aig = Aig::from_file("assets/circuits/half_adder.aag").unwrap();
        let report = aig.fraig(&FraigConfig::default()).unwrap();
        assert_eq!(report, FraigReport::default());
        assert_eq!(aig.num_ands(), 3);
    }

    #[test]
    fn random_fraig_is_sound() {
        for seed in 0..20 {
            let mut aig = random_aig(seed, 6, 60, 4);
            let before = truth_tables(&mut aig);
            let sim = SimConfig::default().with_seed(seed).with_max_rounds(2);
            aig.fraig_reduce(&sim, &FraigConfig::default()).unwrap();
            aig.check_integrity().unwrap();
            assert_eq!(truth_tables(&mut aig), before);
        }
    }

    #[test]
    fn exhaustive_simulation_leaves_nothing_to_disprove() {
        // With every assignment simulated, classes are exact
        for seed in 0..10 {
            let mut aig = random_aig(seed, 6, 40, 3);
            let mut patterns = String::new();
            for k in 0..64u32 {
                patterns.push_str(&format!("{:06b}\n", k));
            }
            aig.file_sim(patterns.as_bytes(), None).unwrap();
            let report = aig.fraig(&FraigConfig::default()).unwrap();
            assert_eq!(report.disproved, 0);
            aig.check_integrity().unwrap();
        }
    }
}
