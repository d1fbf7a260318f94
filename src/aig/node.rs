use std::fmt::Display;

use super::{AigEdge, AigError, FaninId, Result};
use crate::sat::SatVar;

/// A node id.
///
/// The constant node [`AigNodeKind::False`] has id 0 by convention. Ids are dense indices into
/// the [`Aig`] arena and are never reused while the circuit is alive.
///
/// [`Aig`]: crate::Aig
pub type NodeId = usize;

/// The kind of a gate, together with its fanins.
///
/// The number of fanins is fixed by the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AigNodeKind {
    /// The constant low/false signal.
    False,
    /// A primary input.
    Input,
    /// A primary output, driven by a single fanin.
    Output { fanin: AigEdge },
    /// An AND gate with two fanins.
    And { fanin0: AigEdge, fanin1: AigEdge },
    /// A placeholder for a literal that was referenced but never defined.
    Undefined,
}

/// An AIG node.
///
/// Each node has an id. By convention, id for constant node `False` is 0. The id must be unique.
///
/// Internal note: gates carry their fanouts with them. Make sure to update this correctly,
/// only [`Aig`] mutation primitives are allowed to touch fanins and fanouts.
///
/// [`Aig`]: crate::Aig
#[derive(Debug, Clone)]
pub struct AigNode {
    pub(crate) id: NodeId,
    pub(crate) kind: AigNodeKind,
    pub(crate) name: Option<String>,
    /// Line of the source file defining this gate (0 if not from a file).
    pub(crate) line: usize,
    /// Unordered multiset of consumers. A consumer using this node twice appears twice.
    pub(crate) fanouts: Vec<AigEdge>,
    /// 64 simulation patterns, one per bit.
    pub(crate) pattern: u64,
    /// Index of the candidate-equivalence class this node belongs to.
    pub(crate) fec: Option<usize>,
    pub(crate) var: Option<SatVar>,
    /// Last traversal stamp that visited this node.
    pub(crate) stamp: u64,
}

impl PartialEq for AigNode {
    /// Structural equality: id, kind, name and fanouts as a multiset.
    /// Simulation, candidate class and solver state are ignored.
    fn eq(&self, other: &Self) -> bool {
        let mut f1 = self.fanouts.clone();
        let mut f2 = other.fanouts.clone();
        f1.sort_unstable();
        f2.sort_unstable();
        self.id == other.id && self.kind == other.kind && self.name == other.name && f1 == f2
    }
}

impl Eq for AigNode {}

impl Display for AigNodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AigNodeKind::False => "CONST",
            AigNodeKind::Input => "PI",
            AigNodeKind::Output { .. } => "PO",
            AigNodeKind::And { .. } => "AIG",
            AigNodeKind::Undefined => "UNDEF",
        };
        write!(f, "{}", s)
    }
}

impl AigNode {
    pub(crate) fn new(id: NodeId, kind: AigNodeKind, line: usize) -> Self {
        AigNode {
            id,
            kind,
            name: None,
            line,
            fanouts: Vec::new(),
            pattern: 0,
            fec: None,
            var: None,
            stamp: 0,
        }
    }

    pub fn is_false(&self) -> bool {
        matches!(self.kind, AigNodeKind::False)
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, AigNodeKind::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.kind, AigNodeKind::Output { .. })
    }

    pub fn is_and(&self) -> bool {
        matches!(self.kind, AigNodeKind::And { .. })
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.kind, AigNodeKind::Undefined)
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }

    pub fn get_kind(&self) -> &AigNodeKind {
        &self.kind
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get_line(&self) -> usize {
        self.line
    }

    pub fn get_pattern(&self) -> u64 {
        self.pattern
    }

    pub fn get_fec(&self) -> Option<usize> {
        self.fec
    }

    pub fn get_var(&self) -> Option<SatVar> {
        self.var
    }

    pub fn get_fanins(&self) -> Vec<AigEdge> {
        match self.kind {
            AigNodeKind::Output { fanin } => vec![fanin],
            AigNodeKind::And { fanin0, fanin1 } => vec![fanin0, fanin1],
            _ => vec![],
        }
    }

    pub fn get_fanouts(&self) -> &[AigEdge] {
        &self.fanouts
    }

    pub(super) fn get_fanin(&self, fanin_id: FaninId) -> Result<AigEdge> {
        match (&self.kind, fanin_id) {
            (AigNodeKind::Output { fanin }, FaninId::Fanin0) => Ok(*fanin),
            (AigNodeKind::And { fanin0, .. }, FaninId::Fanin0) => Ok(*fanin0),
            (AigNodeKind::And { fanin1, .. }, FaninId::Fanin1) => Ok(*fanin1),
            _ => Err(AigError::NoFanin(self.id)),
        }
    }

    /// Overwrites one fanin. Does not touch the fanouts of the previous and new driver,
    /// that is the job of [`Aig::rewire_fanin`].
    ///
    /// [`Aig::rewire_fanin`]: crate::Aig::rewire_fanin
    pub(super) fn set_fanin(&mut self, fanin: AigEdge, fanin_id: FaninId) -> Result<()> {
        match (&mut self.kind, fanin_id) {
            (AigNodeKind::Output { fanin: f }, FaninId::Fanin0) => *f = fanin,
            (AigNodeKind::And { fanin0, .. }, FaninId::Fanin0) => *fanin0 = fanin,
            (AigNodeKind::And { fanin1, .. }, FaninId::Fanin1) => *fanin1 = fanin,
            _ => return Err(AigError::NoFanin(self.id)),
        }
        Ok(())
    }

    /// Finds the slot of the fanin equal to `edge`.
    pub(super) fn find_fanin(&self, edge: AigEdge) -> Option<FaninId> {
        match self.kind {
            AigNodeKind::Output { fanin } if fanin == edge => Some(FaninId::Fanin0),
            AigNodeKind::And { fanin0, .. } if fanin0 == edge => Some(FaninId::Fanin0),
            AigNodeKind::And { fanin1, .. } if fanin1 == edge => Some(FaninId::Fanin1),
            _ => None,
        }
    }

    pub(super) fn add_fanout(&mut self, fanout: AigEdge) {
        self.fanouts.push(fanout);
    }

    /// Removes one occurrence of `fanout`.
    pub(super) fn remove_fanout(&mut self, fanout: AigEdge) -> Result<()> {
        match self.fanouts.iter().position(|f| *f == fanout) {
            Some(pos) => {
                self.fanouts.swap_remove(pos);
                Ok(())
            }
            None => Err(AigError::ConsistencyViolation(format!(
                "failed to remove fanout {} (not found) from node {}",
                fanout, self.id
            ))),
        }
    }

    /// Value of the node for all 64 patterns, given the patterns of its fanins.
    pub(crate) fn eval(&self, fanin_pattern: impl Fn(AigEdge) -> u64) -> u64 {
        match self.kind {
            AigNodeKind::False | AigNodeKind::Undefined => 0,
            AigNodeKind::Input => self.pattern,
            AigNodeKind::Output { fanin } => fanin_pattern(fanin),
            AigNodeKind::And { fanin0, fanin1 } => fanin_pattern(fanin0) & fanin_pattern(fanin1),
        }
    }
}
