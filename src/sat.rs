//! The SAT side of equivalence proofs.
//!
//! [`Aig::fraig`] only talks to a [`ProofService`]: it pushes the clauses of the circuit once,
//! then issues a sequence of solves, each one under its own assumptions.
//! [`VarisatService`] implements it on top of the [varisat](https://docs.rs/varisat) solver,
//! which supports this kind of incremental use.
//!
//! [`Aig::fraig`]: crate::Aig::fraig

use varisat::{ExtendFormula, Lit, Solver, Var};

use crate::Result;

/// Opaque handle on a solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SatVar(pub(crate) usize);

/// Answer of the solver under the current assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatOutcome {
    /// There is an assignment satisfying the clauses and the assumptions.
    Sat,
    /// There is none.
    Unsat,
}

/// A request/response SAT service.
///
/// Clauses are permanent, assumptions only hold until [`release_assumptions`].
/// Polarity arguments are set when the corresponding input is negated.
///
/// [`release_assumptions`]: ProofService::release_assumptions
pub trait ProofService {
    fn new_variable(&mut self) -> SatVar;

    /// Constrains `out <=> in0 ^ pol0 & in1 ^ pol1`.
    fn assert_and_gate(
        &mut self,
        out: SatVar,
        in0: SatVar,
        pol0: bool,
        in1: SatVar,
        pol1: bool,
    );

    /// Constrains `out <=> (in0 ^ pol0) xor (in1 ^ pol1)`.
    fn assert_xor(
        &mut self,
        out: SatVar,
        in0: SatVar,
        pol0: bool,
        in1: SatVar,
        pol1: bool,
    );

    /// Assumes `var` has `value` for the next solves.
    fn assume_value(&mut self, var: SatVar, value: bool);

    fn release_assumptions(&mut self);

    fn solve_under_assumptions(&mut self) -> Result<SatOutcome>;
}

/// [`ProofService`] backed by varisat.
pub struct VarisatService {
    solver: Solver<'static>,
    vars: Vec<Var>,
    assumptions: Vec<Lit>,
}

impl Default for VarisatService {
    fn default() -> Self {
        Self::new()
    }
}

impl VarisatService {
    pub fn new() -> Self {
        VarisatService {
            solver: Solver::new(),
            vars: Vec::new(),
            assumptions: Vec::new(),
        }
    }

    /// Number of variables handed out so far.
    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    fn lit(&self, var: SatVar, negated: bool) -> Lit {
        let lit = self.vars[var.0].positive();
        if negated { !lit } else { lit }
    }
}

impl ProofService for VarisatService {
    fn new_variable(&mut self) -> SatVar {
        self.vars.push(self.solver.new_var());
        SatVar(self.vars.len() - 1)
    }

    // Tseitin encoding of out <=> a & b:
    // (out | !a | !b) & (!out | a) & (!out | b)
    fn assert_and_gate(
        &mut self,
        out: SatVar,
        in0: SatVar,
        pol0: bool,
        in1: SatVar,
        pol1: bool,
    ) {
        let (o, a, b) = (self.lit(out, false), self.lit(in0, pol0), self.lit(in1, pol1));
        self.solver.add_clause(&[!a, !b, o]);
        self.solver.add_clause(&[a, !o]);
        self.solver.add_clause(&[b, !o]);
    }

    fn assert_xor(
        &mut self,
        out: SatVar,
        in0: SatVar,
        pol0: bool,
        in1: SatVar,
        pol1: bool,
    ) {
        let (o, a, b) = (self.lit(out, false), self.lit(in0, pol0), self.lit(in1, pol1));
        self.solver.add_clause(&[!a, !b, !o]);
        self.solver.add_clause(&[a, b, !o]);
        self.solver.add_clause(&[a, !b, o]);
        self.solver.add_clause(&[!a, b, o]);
    }

    fn assume_value(&mut self, var: SatVar, value: bool) {
        let lit = self.lit(var, !value);
        self.assumptions.push(lit);
    }

    fn release_assumptions(&mut self) {
        self.assumptions.clear();
    }

    fn solve_under_assumptions(&mut self) -> Result<SatOutcome> {
        self.solver.assume(&self.assumptions);
        match self.solver.solve() {
            Ok(true) => Ok(SatOutcome::Sat),
            Ok(false) => Ok(SatOutcome::Unsat),
            Err(e) => Err(e.into()),
        }
    }
}
