use std::collections::HashMap;

use crate::{Aig, AigEdge, AigError, AigNodeKind, NodeId, Result};

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug and test purposes, as the library is supposed to
    /// maintain integrity of the AIG at any moment. It checks that:
    /// - every node sits at the slot of its id, and only the constant has id 0
    /// - every edge points at a live node
    /// - fanins and fanouts are symmetric (as multisets)
    /// - inputs and outputs lists match the node kinds
    /// - candidate classes and node class ids agree
    /// - the graph is acyclic.
    pub fn check_integrity(&self) -> Result<()> {
        // Expected fanouts, rebuilt from the fanins
        let mut expected: HashMap<NodeId, Vec<AigEdge>> = HashMap::new();

        for node in self.nodes() {
            let id = node.get_id();
            if self.get_node(id).map(|n| n.get_id()) != Some(id) {
                return Err(AigError::ConsistencyViolation("incoherent node id".to_string()));
            }
            if (id == 0) != node.is_false() {
                return Err(AigError::ConsistencyViolation(format!(
                    "id=0 is for node False only (found {} {})",
                    node.get_kind(),
                    id
                )));
            }
            for fanin in node.get_fanins() {
                self.check_edge_integrity(&fanin)?;
                expected
                    .entry(fanin.node)
                    .or_default()
                    .push(AigEdge::new(id, fanin.complement));
            }
        }

        for node in self.nodes() {
            let mut fanouts = node.get_fanouts().to_vec();
            for fanout in &fanouts {
                self.check_edge_integrity(fanout)?;
            }
            let mut wanted = expected.remove(&node.get_id()).unwrap_or_default();
            fanouts.sort_unstable();
            wanted.sort_unstable();
            if fanouts != wanted {
                return Err(AigError::ConsistencyViolation(format!(
                    "fanouts of node {} are {:?} but its consumers are {:?}",
                    node.get_id(),
                    fanouts,
                    wanted
                )));
            }
        }

        for &id in self.get_inputs() {
            if !self.node(id)?.is_input() {
                return Err(AigError::ConsistencyViolation(format!(
                    "input {} is not an input node",
                    id
                )));
            }
        }
        for &id in self.get_outputs() {
            if !self.node(id)?.is_output() {
                return Err(AigError::ConsistencyViolation(format!(
                    "output {} is not an output node",
                    id
                )));
            }
        }

        self.check_fec_integrity()?;
        self.check_acyclic()
    }

    fn check_edge_integrity(&self, edge: &AigEdge) -> Result<()> {
        self.get_node(edge.node)
            .ok_or(AigError::ConsistencyViolation(format!(
                "edge pointing at node {} which is not in the AIG anymore",
                edge.node
            )))?;
        Ok(())
    }

    /// A gate with class id k is listed exactly once, in class k only.
    fn check_fec_integrity(&self) -> Result<()> {
        let classes = self
            .partition
            .as_ref()
            .map(|p| p.classes())
            .unwrap_or_default();
        let mut seen: HashMap<NodeId, usize> = HashMap::new();
        for (k, class) in classes.iter().enumerate() {
            for &id in class {
                if seen.insert(id, k).is_some() {
                    return Err(AigError::ConsistencyViolation(format!(
                        "gate {} is listed twice in candidate classes",
                        id
                    )));
                }
            }
        }
        for node in self.nodes() {
            if let Some(k) = node.get_fec() {
                if seen.get(&node.get_id()) != Some(&k) {
                    return Err(AigError::ConsistencyViolation(format!(
                        "gate {} claims class {} but is not listed there",
                        node.get_id(),
                        k
                    )));
                }
            }
        }
        Ok(())
    }

    /// Three-color DFS over fanins.
    fn check_acyclic(&self) -> Result<()> {
        // 1 = on the stack, 2 = done
        let mut color: HashMap<NodeId, u8> = HashMap::new();
        for root in self.nodes() {
            if color.contains_key(&root.get_id()) {
                continue;
            }
            let mut stack = vec![(root.get_id(), false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    color.insert(id, 2);
                    continue;
                }
                match color.get(&id) {
                    Some(2) => continue,
                    Some(_) => {
                        return Err(AigError::ConsistencyViolation(format!(
                            "found a cycle through node {}",
                            id
                        )));
                    }
                    None => (),
                }
                color.insert(id, 1);
                stack.push((id, true));
                if let AigNodeKind::And { fanin0, fanin1 } = self.node(id)?.get_kind() {
                    for fanin in [fanin0, fanin1] {
                        match color.get(&fanin.node) {
                            Some(2) => (),
                            Some(_) => {
                                return Err(AigError::ConsistencyViolation(format!(
                                    "found a cycle through node {}",
                                    fanin.node
                                )));
                            }
                            None => stack.push((fanin.node, false)),
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
