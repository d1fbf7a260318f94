//! Functional reduction of combinational And-Inverter Graphs.
//!
//! An [`Aig`] is loaded from an ASCII AIGER file, then reduced by merging the gates computing
//! the same function (possibly up to an inversion): structural hashing ([`Aig::strash`]),
//! peephole simplification ([`Aig::optimize`]), removal of unused gates ([`Aig::sweep`]),
//! and simulation-guided SAT proofs ([`Aig::fraig_reduce`]).
//!
//! ```rust
//! use fraig::{Aig, FraigConfig, SimConfig};
//!
//! let mut aig = Aig::from_file("assets/circuits/redundant.aag").unwrap();
//! aig.strash().unwrap();
//! aig.optimize().unwrap();
//! aig.fraig_reduce(&SimConfig::default().with_seed(1), &FraigConfig::default())
//!     .unwrap();
//! aig.check_integrity().unwrap();
//! print!("{}", aig.summary());
//! print!("{}", aig.to_aag().unwrap());
//! ```

pub mod aig;
pub mod fec;
pub mod fraig;
pub mod opt;
pub mod sat;
pub mod sim;
pub mod strash;
#[cfg(test)]
mod testutil;

// Re-exporting symbols and modules.
pub use aig::dfs;
pub use aig::{
    Aig, AigEdge, AigError, AigNode, AigNodeKind, FaninId, NodeId, ParserError, Result, SimError,
};
pub use fec::FecPartition;
pub use fraig::{FraigConfig, FraigReport};
pub use sat::{ProofService, SatOutcome, SatVar, VarisatService};
pub use sim::{SimConfig, SimReport};
