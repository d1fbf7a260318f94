//! Export to the ASCII AIGER format, either the whole circuit ([`Aig::to_aag`]) or the fanin
//! cone of a single gate ([`Aig::cone_to_aag`]).
//!
//! ```rust
//! use fraig::Aig;
//!
//! let mut aig = Aig::from_file("assets/circuits/half_adder.aag").unwrap();
//! let text = aig.to_aag().unwrap();
//! assert!(text.starts_with("aag 5 2 0 2 3\n"));
//! ```

use crate::{Aig, AigError, AigNodeKind, NodeId, Result};

const COMMENT: &str = "AAG output by fraig";

fn and_line(id: NodeId, kind: &AigNodeKind) -> Option<String> {
    match kind {
        AigNodeKind::And { fanin0, fanin1 } => Some(format!(
            "{} {} {}\n",
            2 * id,
            fanin0.literal(),
            fanin1.literal()
        )),
        _ => None,
    }
}

impl Aig {
    /// The whole circuit, in ASCII AIGER.
    ///
    /// The header keeps the maximum variable index of the loaded file, but only counts the AND
    /// gates reachable from the outputs. They are written in dependency order.
    pub fn to_aag(&mut self) -> Result<String> {
        let order = self.dfs_order();
        let mut decl_ands = String::new();
        let mut n_ands = 0;
        for &id in &order {
            if let Some(line) = and_line(id, self.node(id)?.get_kind()) {
                decl_ands.push_str(&line);
                n_ands += 1;
            }
        }

        let mut res = format!(
            "aag {} {} 0 {} {}\n",
            self.get_max_var(),
            self.num_inputs(),
            self.num_outputs(),
            n_ands
        );
        for &id in self.get_inputs() {
            res.push_str(&format!("{}\n", 2 * id));
        }
        for edge in self.get_output_edges()? {
            res.push_str(&format!("{}\n", edge.literal()));
        }
        res.push_str(&decl_ands);

        for (k, &id) in self.get_inputs().iter().enumerate() {
            if let Some(name) = self.node(id)?.get_name() {
                res.push_str(&format!("i{} {}\n", k, name));
            }
        }
        for (k, &id) in self.get_outputs().iter().enumerate() {
            if let Some(name) = self.node(id)?.get_name() {
                res.push_str(&format!("o{} {}\n", k, name));
            }
        }
        res.push_str(&format!("c\n{}\n", COMMENT));
        Ok(res)
    }

    /// The fanin cone of gate `id` as a standalone circuit, with `id` as its only output.
    ///
    /// Gate ids are kept. The header is recomputed from what the cone actually contains:
    /// `M` is the largest defined id, `I` the inputs reached, `A` the AND gates reached.
    /// Inputs keep their declaration order and names, renumbered among the reached ones.
    pub fn cone_to_aag(&mut self, id: NodeId) -> Result<String> {
        let gate = self.node(id)?;
        if !(gate.is_and() || gate.is_input()) {
            return Err(AigError::ConsistencyViolation(format!(
                "cannot write the cone of {} gate {}",
                gate.get_kind(),
                id
            )));
        }

        let order = self.dfs_order_from(id);
        let mut max_var = 0;
        let mut n_inputs = 0;
        let mut decl_ands = String::new();
        let mut n_ands = 0;
        for &g in &order {
            let node = self.node(g)?;
            if !node.is_undefined() {
                max_var = max_var.max(g);
            }
            if node.is_input() {
                n_inputs += 1;
            }
            if let Some(line) = and_line(g, node.get_kind()) {
                decl_ands.push_str(&line);
                n_ands += 1;
            }
        }

        let inputs = self
            .get_inputs()
            .iter()
            .copied()
            .filter(|i| order.contains(i))
            .collect::<Vec<_>>();

        let mut res = format!("aag {} {} 0 1 {}\n", max_var, n_inputs, n_ands);
        for &i in &inputs {
            res.push_str(&format!("{}\n", 2 * i));
        }
        res.push_str(&format!("{}\n", 2 * id));
        res.push_str(&decl_ands);
        for (k, &i) in inputs.iter().enumerate() {
            if let Some(name) = self.node(i)?.get_name() {
                res.push_str(&format!("i{} {}\n", k, name));
            }
        }
        res.push_str(&format!("o0 {}\nc\nWrite gate ({}) by fraig\n", id, id));
        Ok(res)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_test() {
        let mut aig = Aig::from_file("assets/circuits/half_adder.aag").unwrap();
        let text = aig.to_aag().unwrap();
        assert_eq!(
            text,
            "aag 5 2 0 2 3\n2\n4\n10\n6\n6 2 4\n8 3 5\n10 7 9\n\
             i0 x\ni1 y\no0 sum\no1 carry\nc\nAAG output by fraig\n"
        );

        let reloaded = Aig::from_ascii(text.as_bytes()).unwrap();
        assert_eq!(reloaded, aig);
        assert_eq!(reloaded.get_output_edges().unwrap(), aig.get_output_edges().unwrap());
    }

    #[test]
    fn unreachable_gates_are_not_written() {
        let mut aig = Aig::from_file("assets/circuits/undefined.aag").unwrap();
        let text = aig.to_aag().unwrap();
        // gate 6 floats, the header keeps M
        assert!(text.starts_with("aag 7 2 0 2 2\n2\n4\n10\n9\n8 2 4\n10 8 14\n"));
        let reloaded = Aig::from_ascii(text.as_bytes()).unwrap();
        assert_eq!(reloaded.num_ands(), 2);
        assert!(reloaded.node(7).unwrap().is_undefined());
    }

    #[test]
    fn cone_to_aag_test() {
        let mut aig = Aig::from_file("assets/circuits/half_adder.aag").unwrap();
        assert_eq!(
            aig.cone_to_aag(3).unwrap(),
            "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\ni0 x\ni1 y\no0 3\nc\nWrite gate (3) by fraig\n"
        );

        let cone = aig.cone_to_aag(5).unwrap();
        let sub = Aig::from_ascii(cone.as_bytes()).unwrap();
        assert_eq!(sub.num_inputs(), 2);
        assert_eq!(sub.num_ands(), 3);
        assert_eq!(sub.get_max_var(), 5);

        assert!(aig.cone_to_aag(6).is_err()); // output gate
        assert!(aig.cone_to_aag(42).is_err());
    }

    #[test]
    fn cone_with_undefined_test() {
        let mut aig = Aig::from_file("assets/circuits/undefined.aag").unwrap();
        let cone = aig.cone_to_aag(5).unwrap();
        // 7 is undefined, M stops at 5
        assert!(cone.starts_with("aag 5 2 0 1 2\n2\n4\n10\n8 2 4\n10 8 14\n"));
        // cone of an input
        assert!(aig.cone_to_aag(2).unwrap().starts_with("aag 2 1 0 1 0\n4\n4\n"));
    }
}
