//! Structural hashing: AND gates reading the same two edges are the same gate.

use std::collections::HashMap;

use log::{debug, info};

use crate::{Aig, AigEdge, AigNodeKind, NodeId, Result};

/// Order-independent key of an AND gate. Polarities are part of the key.
fn strash_key(fanin0: AigEdge, fanin1: AigEdge) -> (AigEdge, AigEdge) {
    if fanin0 <= fanin1 {
        (fanin0, fanin1)
    } else {
        (fanin1, fanin0)
    }
}

impl Aig {
    /// Merges every AND gate into the first structurally identical gate met in dependency
    /// order. Returns the number of merges.
    ///
    /// Gates are visited after their fanins, so duplicates created by a merge
    /// (`a & b` and `a' & b` once `a'` became `a`) are caught in the same pass.
    pub fn strash(&mut self) -> Result<usize> {
        let order = self.dfs_order();
        let mut table: HashMap<(AigEdge, AigEdge), NodeId> = HashMap::with_capacity(order.len());
        let mut merged = 0;

        for id in order {
            let &AigNodeKind::And { fanin0, fanin1 } = self.node(id)?.get_kind() else {
                continue;
            };
            match table.get(&strash_key(fanin0, fanin1)) {
                Some(&keep) => {
                    debug!("strash: merging {} into {}", id, keep);
                    self.merge_in_order(keep, id, false)?;
                    merged += 1;
                }
                None => {
                    table.insert(strash_key(fanin0, fanin1), id);
                }
            }
        }

        info!("strash: {} gates merged", merged);
        Ok(merged)
    }
}
