//! Module defining the [`Aig`] struct, as well as [`AigNode`], [`AigEdge`] and some others relevant structs.
//!
//! To reduce a circuit, check [`Aig::strash`], [`Aig::optimize`], [`Aig::sweep`] and the
//! simulation / proof pipeline in [`Aig::fraig_reduce`].

pub mod dfs;
pub mod edge;
pub mod error;
mod integrity;
pub mod node;
mod parser;
pub mod report;
mod writer;

pub use edge::{AigEdge, FaninId};
pub use error::{AigError, ParserError, Result, SimError};
pub use node::{AigNode, AigNodeKind, NodeId};

use std::collections::TryReserveError;

use crate::fec::FecPartition;
use dfs::Dfs;

/// A whole combinational AIG.
///
/// Nodes live in an arena indexed by their [`NodeId`], edges only carry ids.
/// A slot is emptied when its node is merged or swept, and is never handed out again,
/// so an id always denotes the same gate during the lifetime of the circuit.
///
/// Every mutation primitive ([`Aig::rewire_fanin`], [`Aig::merge`], [`Aig::remove`]) updates
/// both sides of an edge, so that gate `A` lists fanout `(B, p)` iff `B` lists fanin `(A, p)`.
#[derive(Debug, Clone)]
pub struct Aig {
    nodes: Vec<Option<AigNode>>,
    /// Primary inputs, in declaration order.
    inputs: Vec<NodeId>,
    /// Primary output gates, in declaration order.
    outputs: Vec<NodeId>,
    /// Largest variable index (`M` in the AIGER header).
    max_var: NodeId,
    /// Last traversal stamp handed out, see [`dfs::Dfs`].
    stamp: u64,
    /// Candidate equivalence classes, `None` until a first simulation.
    pub(crate) partition: Option<FecPartition>,
}

impl Default for Aig {
    fn default() -> Self {
        Self::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node [`AigNodeKind::False`] included).
    pub fn new() -> Self {
        Aig {
            nodes: vec![Some(AigNode::new(0, AigNodeKind::False, 0))],
            inputs: Vec::new(),
            outputs: Vec::new(),
            max_var: 0,
            stamp: 0,
            partition: None,
        }
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&AigNode> {
        self.nodes.get(id)?.as_ref()
    }

    /// Retrieves a node from its id, failing if it does not exist.
    pub fn node(&self, id: NodeId) -> Result<&AigNode> {
        self.get_node(id).ok_or(AigError::NodeDoesNotExist(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut AigNode> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(AigError::NodeDoesNotExist(id))
    }

    /// Iterates over all live nodes, by increasing id.
    pub fn nodes(&self) -> impl Iterator<Item = &AigNode> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut AigNode> {
        self.nodes.iter_mut().filter_map(Option::as_mut)
    }

    /// One past the largest id ever allocated.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Retrieves inputs id, in declaration order.
    pub fn get_inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Retrieves output gates id, in declaration order.
    pub fn get_outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Retrieves the edge driving each output, in declaration order.
    ///
    /// This is the output literal of the AIGER format: it always reflects the current fanin
    /// of the output gate, even after merges.
    pub fn get_output_edges(&self) -> Result<Vec<AigEdge>> {
        self.outputs
            .iter()
            .map(|&id| self.node(id)?.get_fanin(FaninId::Fanin0))
            .collect()
    }

    pub fn get_max_var(&self) -> NodeId {
        self.max_var
    }

    pub(crate) fn set_max_var(&mut self, max_var: NodeId) {
        self.max_var = self.max_var.max(max_var);
    }

    /// Makes room for ids below `slots`, failing instead of aborting when it cannot.
    pub(crate) fn reserve(&mut self, slots: usize) -> std::result::Result<(), TryReserveError> {
        self.nodes.try_reserve(slots.saturating_sub(self.nodes.len()))
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Number of live AND gates (reachable or not).
    pub fn num_ands(&self) -> usize {
        self.nodes().filter(|n| n.is_and()).count()
    }

    /// Hands out a fresh traversal stamp. Stamps only grow, nodes are never reset.
    pub(crate) fn next_stamp(&mut self) -> u64 {
        self.stamp += 1;
        self.stamp
    }

    /// Creates a new node with the given id.
    ///
    /// This will fail if a node with the same id already exists in the AIG,
    /// if a node other than the constant uses id 0, or if a fanin refers to a missing node.
    /// Fanouts of the fanins are registered.
    ///
    /// ```rust
    /// use fraig::{Aig, AigEdge, AigNodeKind};
    /// let mut aig = Aig::new();
    /// aig.add_node(1, AigNodeKind::Input).unwrap();
    /// let and = AigNodeKind::And {
    ///     fanin0: AigEdge::new(1, false),
    ///     fanin1: AigEdge::new(1, true),
    /// }; // represent i1 & !i1 so will be false all the time (just an example)
    /// aig.add_node(2, and.clone()).unwrap();
    ///
    /// // Id 2 is already taken
    /// assert!(aig.add_node(2, and).is_err());
    /// // Id 0 is the constant
    /// assert!(aig.add_node(0, AigNodeKind::Input).is_err());
    /// ```
    pub fn add_node(&mut self, id: NodeId, kind: AigNodeKind) -> Result<NodeId> {
        self.add_node_at_line(id, kind, 0)
    }

    pub(crate) fn add_node_at_line(
        &mut self,
        id: NodeId,
        kind: AigNodeKind,
        line: usize,
    ) -> Result<NodeId> {
        if id == 0 || kind == AigNodeKind::False {
            return Err(AigError::DuplicateId(0));
        }
        if self.get_node(id).is_some() {
            return Err(AigError::DuplicateId(id));
        }
        let node = AigNode::new(id, kind, line);
        let fanins = node.get_fanins();
        for fanin in &fanins {
            self.node(fanin.node)?;
        }

        if self.nodes.len() <= id {
            self.nodes.resize_with(id + 1, || None);
        }
        match node.kind {
            AigNodeKind::Input => self.inputs.push(id),
            AigNodeKind::Output { .. } => self.outputs.push(id),
            _ => (),
        }
        if !node.is_output() {
            self.max_var = self.max_var.max(id);
        }
        self.nodes[id] = Some(node);
        for fanin in fanins {
            self.node_mut(fanin.node)?
                .add_fanout(AigEdge::new(id, fanin.complement));
        }
        Ok(id)
    }

    /// Create a new and node.
    pub fn new_and(&mut self, id: NodeId, fanin0: AigEdge, fanin1: AigEdge) -> Result<NodeId> {
        self.add_node(id, AigNodeKind::And { fanin0, fanin1 })
    }

    /// Create a new output gate driven by `fanin`.
    pub fn new_output(&mut self, id: NodeId, fanin: AigEdge) -> Result<NodeId> {
        self.add_node(id, AigNodeKind::Output { fanin })
    }

    /// Gives a name to an input or output.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    /// Sets the 64 simulation patterns of an input.
    pub fn set_input_pattern(&mut self, id: NodeId, pattern: u64) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.is_input() {
            return Err(AigError::ConsistencyViolation(format!(
                "node {} is not an input, its pattern is computed",
                id
            )));
        }
        node.pattern = pattern;
        Ok(())
    }

    /// Replace the given fanin of a node by a new fanin.
    ///
    /// The previous driver loses the matching fanout and the new driver gains one.
    /// Both nodes need to already exist in the AIG.
    pub fn rewire_fanin(
        &mut self,
        parent_id: NodeId,
        fanin_id: FaninId,
        fanin: AigEdge,
    ) -> Result<()> {
        self.node(fanin.node)?;
        let old = self.node(parent_id)?.get_fanin(fanin_id)?;
        if fanin.node == parent_id {
            return Err(AigError::ConsistencyViolation(format!(
                "node {} cannot be its own fanin",
                parent_id
            )));
        }

        self.node_mut(old.node)?
            .remove_fanout(AigEdge::new(parent_id, old.complement))?;
        self.node_mut(parent_id)?.set_fanin(fanin, fanin_id)?;
        self.node_mut(fanin.node)?
            .add_fanout(AigEdge::new(parent_id, fanin.complement));
        Ok(())
    }

    /// Replace AND gate `drop` by `keep` (complemented if `inverted`), then delete `drop`.
    ///
    /// Every consumer of `drop` is redirected to `keep`, keeping its own edge polarity and
    /// flipping it if `inverted`. `drop` is detached from its fanins and its slot is freed.
    /// Constants, inputs, outputs and undefined gates cannot be dropped, and `keep` must not
    /// depend on `drop`.
    pub fn merge(&mut self, keep: NodeId, drop: NodeId, inverted: bool) -> Result<()> {
        self.node(keep)?;
        let mut dfs = Dfs::from_node(self, keep);
        while let Some(id) = dfs.next(self) {
            if id == drop && id != keep {
                return Err(AigError::ConsistencyViolation(format!(
                    "merging {} into {} would create a cycle, {} depends on it",
                    drop, keep, keep
                )));
            }
        }
        self.merge_in_order(keep, drop, inverted)
    }

    /// [`Aig::merge`] for callers that know `keep` does not depend on `drop`, e.g. because
    /// `keep` comes first in a topological order. Only a direct loop is caught.
    pub(crate) fn merge_in_order(
        &mut self,
        keep: NodeId,
        drop: NodeId,
        inverted: bool,
    ) -> Result<()> {
        self.node(keep)?;
        let dropped = self.node(drop)?;
        if keep == drop || !dropped.is_and() {
            return Err(AigError::ConsistencyViolation(format!(
                "cannot merge {} gate {} into {}",
                dropped.kind, drop, keep
            )));
        }
        let fanins = dropped.get_fanins();
        let fanouts = dropped.fanouts.clone();
        if fanouts.iter().any(|f| f.node == keep) {
            return Err(AigError::ConsistencyViolation(format!(
                "merging {} into its own fanout {} would create a cycle",
                drop, keep
            )));
        }

        for fanin in fanins {
            self.node_mut(fanin.node)?
                .remove_fanout(AigEdge::new(drop, fanin.complement))?;
        }
        for fanout in fanouts {
            let consumer = self.node_mut(fanout.node)?;
            let slot = consumer
                .find_fanin(AigEdge::new(drop, fanout.complement))
                .ok_or_else(|| {
                    AigError::ConsistencyViolation(format!(
                        "node {} lists fanout {} but has no such fanin",
                        drop, fanout
                    ))
                })?;
            let redirected = AigEdge::new(keep, fanout.complement ^ inverted);
            consumer.set_fanin(redirected, slot)?;
            self.node_mut(keep)?
                .add_fanout(AigEdge::new(fanout.node, redirected.complement));
        }

        self.forget_candidate(drop)?;
        self.nodes[drop] = None;
        Ok(())
    }

    /// Delete a gate nobody refers to anymore.
    ///
    /// The gate is detached from its own fanins in the same step. Only AND gates and
    /// undefined gates can be removed, and only once their fanout is empty.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if !(node.is_and() || node.is_undefined()) {
            return Err(AigError::ConsistencyViolation(format!(
                "cannot remove {} gate {}",
                node.kind, id
            )));
        }
        if !node.fanouts.is_empty() {
            return Err(AigError::ConsistencyViolation(format!(
                "cannot remove gate {}, still referenced by {}",
                id, node.fanouts[0].node
            )));
        }
        for fanin in node.get_fanins() {
            self.node_mut(fanin.node)?
                .remove_fanout(AigEdge::new(id, fanin.complement))?;
        }
        self.forget_candidate(id)?;
        self.nodes[id] = None;
        Ok(())
    }

    /// Takes a gate out of its candidate class before it disappears.
    fn forget_candidate(&mut self, id: NodeId) -> Result<()> {
        let fec = self.node(id)?.fec;
        if let (Some(k), Some(partition)) = (fec, self.partition.as_mut()) {
            partition.forget(k, id);
        }
        Ok(())
    }
}

impl PartialEq for Aig {
    /// Compares the two AIGs. They are equal iff:
    /// - their inputs are equal
    /// - their outputs are equal
    /// - their live nodes are equal.
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.nodes().eq(other.nodes())
    }
}
