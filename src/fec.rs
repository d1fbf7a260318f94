//! Functionally equivalent candidates (FEC).
//!
//! Gates whose simulation patterns have always been equal, or always been bitwise complements,
//! are grouped in candidate classes. Every new simulation batch can only split classes.
//! Membership is a hint, not a proof: [`Aig::fraig`] is in charge of proving it.
//!
//! [`Aig::fraig`]: crate::Aig::fraig

use std::collections::HashMap;

use log::{debug, trace};

use crate::{Aig, NodeId};

/// The candidate equivalence classes of an [`Aig`].
///
/// Invariant: each class holds at least two gates, each gate is in at most one class, and its
/// [`AigNode::get_fec`] is the index of that class. Classes keep their members in dependency
/// order, so the first member never depends on the others.
///
/// [`AigNode::get_fec`]: crate::AigNode::get_fec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FecPartition {
    classes: Vec<Vec<NodeId>>,
}

/// Key identifying a pattern up to complement.
fn signature(pattern: u64) -> u64 {
    pattern.min(!pattern)
}

impl FecPartition {
    pub fn classes(&self) -> &[Vec<NodeId>] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Drops a gate that is about to disappear from its class.
    pub(crate) fn forget(&mut self, class: usize, id: NodeId) {
        if let Some(members) = self.classes.get_mut(class) {
            members.retain(|&m| m != id);
        }
    }
}

impl Aig {
    /// The current candidate classes, `None` if no simulation happened since the last proof pass.
    pub fn get_partition(&self) -> Option<&FecPartition> {
        self.partition.as_ref()
    }

    /// Seeds a single class with the constant and every AND gate reachable from the outputs.
    pub fn init_partition(&mut self) {
        self.reset_partition();
        let mut class = vec![0];
        for id in self.dfs_order() {
            if self.get_node(id).is_some_and(|n| n.is_and()) {
                class.push(id);
            }
        }
        for &id in &class {
            if let Ok(node) = self.node_mut(id) {
                node.fec = Some(0);
            }
        }
        debug!("initial candidate class with {} gates", class.len());
        self.partition = Some(FecPartition {
            classes: vec![class],
        });
    }

    /// Forgets every class, no gate is a candidate anymore.
    pub fn reset_partition(&mut self) {
        for node in self.nodes_mut() {
            node.fec = None;
        }
        self.partition = None;
    }

    /// Splits every class according to the current simulation patterns.
    ///
    /// Members are bucketed by pattern up to complement, buckets of a single gate are dropped
    /// and the remaining buckets replace the previous partition. Returns the number of classes.
    pub fn refine_partition(&mut self) -> usize {
        let Some(partition) = self.partition.take() else {
            return 0;
        };

        let mut classes = Vec::new();
        for class in partition.classes {
            let mut buckets: Vec<Vec<NodeId>> = Vec::new();
            let mut index: HashMap<u64, usize> = HashMap::with_capacity(class.len());
            for id in class {
                let Some(node) = self.get_node(id) else {
                    continue;
                };
                let sig = signature(node.pattern);
                match index.get(&sig) {
                    Some(&k) => buckets[k].push(id),
                    None => {
                        index.insert(sig, buckets.len());
                        buckets.push(vec![id]);
                    }
                }
            }
            for bucket in buckets {
                if bucket.len() > 1 {
                    classes.push(bucket);
                } else if let Ok(node) = self.node_mut(bucket[0]) {
                    node.fec = None;
                }
            }
        }

        for (k, class) in classes.iter().enumerate() {
            for &id in class {
                if let Ok(node) = self.node_mut(id) {
                    node.fec = Some(k);
                }
            }
        }
        trace!("{} candidate classes", classes.len());
        let n = classes.len();
        self.partition = Some(FecPartition { classes });
        n
    }
}
