//! An [`AigEdge`] points at an [`AigNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! Edges never hold references to nodes, only their id: the node itself lives in the arena
//! owned by the [`Aig`].
//!
//! [`AigNode`]: crate::AigNode
//! [`Aig`]: crate::Aig

use std::{fmt::Display, ops::Not};

use crate::NodeId;

/// Unambiguous fanin selector.
///
/// Primary outputs only have [`FaninId::Fanin0`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaninId {
    Fanin0,
    Fanin1,
}

impl From<bool> for FaninId {
    fn from(value: bool) -> Self {
        if value {
            FaninId::Fanin1
        } else {
            FaninId::Fanin0
        }
    }
}

impl FaninId {
    pub fn index(self) -> usize {
        match self {
            FaninId::Fanin0 => 0,
            FaninId::Fanin1 => 1,
        }
    }
}

/// A directed edge, used both for fanins and fanouts.
///
/// The edge can carry an inverter according to the value of `complement`.
/// As a fanin, `node` is the driver; as a fanout, `node` is the consumer. In both cases the
/// complement bit is the same: gate `A` lists fanout `(B, p)` iff `B` lists fanin `(A, p)`.
///
/// For example:
///
/// ```rust
/// use fraig::AigEdge;
/// let fanin_false = AigEdge::new(0, false);
/// let fanin_true = AigEdge::new(0, true);
/// assert_eq!(fanin_false, !fanin_true);
/// assert!(fanin_true.is_cst_true());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AigEdge {
    /// The node the edge is refering to.
    pub(crate) node: NodeId,
    /// Set to true if signal should be inverted.
    pub(crate) complement: bool,
}

impl Not for AigEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl From<&AigEdge> for (NodeId, bool) {
    fn from(edge: &AigEdge) -> Self {
        (edge.node, edge.complement)
    }
}

impl Display for AigEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.complement {
            write!(f, "!{}", self.node)
        } else {
            write!(f, "{}", self.node)
        }
    }
}

impl AigEdge {
    pub fn new(node: NodeId, complement: bool) -> Self {
        AigEdge { node, complement }
    }

    /// Decodes an AIGER literal (`2 * id + complement`).
    pub fn from_literal(literal: u64) -> Self {
        AigEdge {
            node: (literal >> 1) as NodeId,
            complement: literal & 1 == 1,
        }
    }

    /// Encodes the edge as an AIGER literal.
    pub fn literal(&self) -> u64 {
        2 * self.node as u64 + self.complement as u64
    }

    pub fn get_node_id(&self) -> NodeId {
        self.node
    }

    pub fn get_complement(&self) -> bool {
        self.complement
    }

    /// Returns the same edge, complemented if `flip` is set.
    pub fn xor(self, flip: bool) -> Self {
        AigEdge {
            node: self.node,
            complement: self.complement ^ flip,
        }
    }

    pub fn is_cst_false(&self) -> bool {
        self.node == 0 && !self.complement
    }

    pub fn is_cst_true(&self) -> bool {
        self.node == 0 && self.complement
    }

    pub fn is_complement_of(&self, other: &AigEdge) -> bool {
        self.node == other.node && self.complement ^ other.complement
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn edge_eq() {
        let e1 = AigEdge::new(0, false);
        let e2 = AigEdge::new(0, false);
        assert_eq!(e1, e2);

        let e3 = AigEdge::new(1, false);
        assert_ne!(e1, e3);

        let e4 = AigEdge::new(0, true);
        assert_ne!(e1, e4);
        assert_eq!(e1, !e4);
        assert!(e1.is_complement_of(&e4));
        assert!(!e1.is_complement_of(&e3));
    }

    #[test]
    fn literal_test() {
        assert_eq!(AigEdge::from_literal(7), AigEdge::new(3, true));
        assert_eq!(AigEdge::from_literal(6), AigEdge::new(3, false));
        assert_eq!(AigEdge::new(21, true).literal(), 43);
        assert!(AigEdge::from_literal(0).is_cst_false());
        assert!(AigEdge::from_literal(1).is_cst_true());
        assert_eq!(AigEdge::new(4, false).xor(true), AigEdge::new(4, true));
        assert_eq!(format!("{}", AigEdge::new(4, true)), "!4");
    }
}
