//! Human readable reports about a circuit: statistics, netlist, floating gates,
//! candidate classes and per-gate details.
//!
//! Every report is returned as a `String`, printing is left to the caller.
//!
//! ```rust
//! use fraig::Aig;
//!
//! let aig = Aig::from_file("assets/circuits/half_adder.aag").unwrap();
//! println!("{}", aig.summary());
//! println!("{}", aig.fanin_report(5, 2).unwrap());
//! ```

use std::collections::HashSet;

use crate::{Aig, AigEdge, AigNode, AigNodeKind, NodeId, Result};

const BANNER: &str =
    "================================================================================";

/// `!3`, or `*!3` if gate 3 is undefined.
fn fanin_decl(aig: &Aig, edge: &AigEdge) -> String {
    let undef = aig.get_node(edge.node).is_some_and(|n| n.is_undefined());
    format!(
        "{}{}{}",
        if undef { "*" } else { "" },
        if edge.complement { "!" } else { "" },
        edge.node
    )
}

fn gate_decl(aig: &Aig, node: &AigNode) -> String {
    let mut res = match node.get_kind() {
        AigNodeKind::False => "CONST0".to_string(),
        AigNodeKind::Input => format!("PI  {}", node.get_id()),
        AigNodeKind::Output { fanin } => {
            format!("PO  {} {}", node.get_id(), fanin_decl(aig, fanin))
        }
        AigNodeKind::And { fanin0, fanin1 } => format!(
            "AIG {} {} {}",
            node.get_id(),
            fanin_decl(aig, fanin0),
            fanin_decl(aig, fanin1)
        ),
        AigNodeKind::Undefined => format!("UNDEF {}", node.get_id()),
    };
    if let Some(name) = node.get_name() {
        res.push_str(&format!(" ({})", name));
    }
    res
}

/// The 64 patterns, most significant first, grouped by 8.
fn pattern_decl(pattern: u64) -> String {
    let bits = format!("{:064b}", pattern);
    bits.as_bytes()
        .chunks(8)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("_")
}

fn ids_decl(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Which way a cone report walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Fanin,
    Fanout,
}

impl Direction {
    fn next(self, node: &AigNode) -> Vec<AigEdge> {
        match self {
            Direction::Fanin => node.get_fanins(),
            Direction::Fanout => {
                let mut fanouts = node.get_fanouts().to_vec();
                fanouts.sort_unstable();
                fanouts
            }
        }
    }

    /// Gates the walk never goes through.
    fn is_leaf(self, node: &AigNode) -> bool {
        match self {
            Direction::Fanin => node.is_input() || node.is_false() || node.is_undefined(),
            Direction::Fanout => node.is_output(),
        }
    }
}

fn cone_report(
    aig: &Aig,
    dir: Direction,
    edge: AigEdge,
    depth: usize,
    level: usize,
    expanded: &mut HashSet<NodeId>,
    res: &mut String,
) -> Result<()> {
    let node = aig.node(edge.node)?;
    res.push_str(&format!(
        "{}{}{} {}",
        "  ".repeat(depth),
        if edge.complement { "!" } else { "" },
        node.get_kind(),
        node.get_id()
    ));
    if dir.is_leaf(node) || level == 0 {
        res.push('\n');
        return Ok(());
    }
    if expanded.contains(&edge.node) {
        res.push_str(" (*)\n");
        return Ok(());
    }
    res.push('\n');
    let next = dir.next(node);
    if next.is_empty() {
        return Ok(());
    }
    expanded.insert(edge.node);
    for e in next {
        cone_report(aig, dir, e, depth + 1, level - 1, expanded, res)?;
    }
    Ok(())
}

impl Aig {
    /// ```text
    /// Circuit Statistics
    /// ==================
    ///   PI           2
    ///   PO           2
    ///   AIG          3
    /// ------------------
    ///   Total        7
    /// ```
    pub fn summary(&self) -> String {
        let (i, o, a) = (self.num_inputs(), self.num_outputs(), self.num_ands());
        format!(
            "Circuit Statistics\n==================\n{:<5}{:>11}\n{:<5}{:>11}\n{:<5}{:>11}\n------------------\n  Total{:>9}\n",
            "  PI",
            i,
            "  PO",
            o,
            "  AIG",
            a,
            i + o + a
        )
    }

    /// Every gate reachable from the outputs, in dependency order, one per line.
    ///
    /// Undefined fanins are marked with `*`, complemented ones with `!`.
    pub fn netlist(&mut self) -> Result<String> {
        let mut res = String::new();
        let mut k = 0;
        for id in self.dfs_order() {
            let node = self.node(id)?;
            if node.is_undefined() {
                continue;
            }
            res.push_str(&format!("[{}] {}\n", k, gate_decl(self, node)));
            k += 1;
        }
        Ok(res)
    }

    pub fn input_report(&self) -> String {
        format!("PIs of the circuit: {}\n", ids_decl(self.get_inputs()))
    }

    pub fn output_report(&self) -> String {
        format!("POs of the circuit: {}\n", ids_decl(self.get_outputs()))
    }

    /// Gates reading an undefined gate, and gates nobody reads.
    /// Empty if there are none.
    pub fn floating_report(&self) -> String {
        let mut floating = Vec::new();
        let mut unused = Vec::new();
        for node in self.nodes() {
            if node.is_false() || node.is_undefined() {
                continue;
            }
            if node.get_fanouts().is_empty() && !node.is_output() {
                unused.push(node.get_id());
            }
            if node
                .get_fanins()
                .iter()
                .any(|f| self.get_node(f.node).is_some_and(|n| n.is_undefined()))
            {
                floating.push(node.get_id());
            }
        }

        let mut res = String::new();
        if !floating.is_empty() {
            res.push_str(&format!(
                "Gates with floating fanin(s): {}\n",
                ids_decl(&floating)
            ));
        }
        if !unused.is_empty() {
            res.push_str(&format!("Gates defined but not used  : {}\n", ids_decl(&unused)));
        }
        res
    }

    /// One line per candidate class, by increasing smallest member.
    ///
    /// Members whose pattern is the complement of the first one are prefixed with `!`.
    pub fn fec_report(&self) -> String {
        let Some(partition) = self.get_partition() else {
            return String::new();
        };
        let mut classes = partition
            .classes()
            .iter()
            .map(|class| {
                let mut class = class.clone();
                class.sort_unstable();
                class
            })
            .filter(|class| !class.is_empty())
            .collect::<Vec<_>>();
        classes.sort_unstable_by_key(|class| class[0]);

        let mut res = String::new();
        for (k, class) in classes.iter().enumerate() {
            let first = self.get_node(class[0]).map(|n| n.pattern).unwrap_or_default();
            res.push_str(&format!("[{}]", k));
            for &id in class {
                let inverted = self.get_node(id).is_some_and(|n| n.pattern == !first);
                res.push_str(&format!(" {}{}", if inverted { "!" } else { "" }, id));
            }
            res.push('\n');
        }
        res
    }

    /// Kind, id, name, source line, candidate peers and simulation value of a gate.
    pub fn gate_report(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        let mut info = format!("{}({})", node.get_kind(), id);
        if let Some(name) = node.get_name() {
            info.push_str(&format!("\"{}\"", name));
        }
        info.push_str(&format!(", line {}", node.get_line()));

        let mut peers = match (node.get_fec(), self.get_partition()) {
            (Some(k), Some(partition)) => partition.classes().get(k).cloned().unwrap_or_default(),
            _ => Vec::new(),
        };
        peers.sort_unstable();
        let mut fecs = String::new();
        for peer in peers.into_iter().filter(|&p| p != id) {
            let inverted = self.get_node(peer).is_some_and(|n| n.pattern == !node.pattern);
            fecs.push_str(&format!(" {}{}", if inverted { "!" } else { "" }, peer));
        }

        Ok(format!(
            "{}\n= {}\n= FECs:{}\n= Value: {}\n{}\n",
            BANNER,
            info,
            fecs,
            pattern_decl(node.pattern),
            BANNER
        ))
    }

    /// The fanin cone of a gate, down to `level` edges away.
    ///
    /// A gate whose cone has already been listed is marked with `(*)` instead of being
    /// expanded again.
    pub fn fanin_report(&self, id: NodeId, level: usize) -> Result<String> {
        self.report_cone(id, level, Direction::Fanin)
    }

    /// The fanout cone of a gate, up to `level` edges away, with the same conventions as
    /// [`Aig::fanin_report`].
    pub fn fanout_report(&self, id: NodeId, level: usize) -> Result<String> {
        self.report_cone(id, level, Direction::Fanout)
    }

    fn report_cone(&self, id: NodeId, level: usize, dir: Direction) -> Result<String> {
        let node = self.node(id)?;
        let mut res = format!("{} {}\n", node.get_kind(), id);
        if level == 0 {
            return Ok(res);
        }
        let mut expanded = HashSet::from([id]);
        for edge in dir.next(node) {
            cone_report(self, dir, edge, 1, level - 1, &mut expanded, &mut res)?;
        }
        Ok(res)
    }
}
