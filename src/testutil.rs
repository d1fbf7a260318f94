//! Helpers shared by the tests: random circuits and exhaustive evaluation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Aig, AigEdge, AigNodeKind, NodeId};

/// Masks of the 6 first inputs, so that 64 bits enumerate all their assignments.
const MASKS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// A random AIG with inputs `1..=n_inputs`, then `n_ands` AND gates, then `n_outputs` outputs.
///
/// Fanins are picked among earlier gates (the constant included), outputs among the last
/// gates, so that some gates end up unreachable.
pub(crate) fn random_aig(seed: u64, n_inputs: usize, n_ands: usize, n_outputs: usize) -> Aig {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut aig = Aig::new();
    for id in 1..=n_inputs {
        aig.add_node(id, AigNodeKind::Input).unwrap();
    }
    let first_and = n_inputs + 1;
    for id in first_and..first_and + n_ands {
        // Favour recent gates to get deep circuits
        let pick = |rng: &mut ChaCha8Rng| {
            let node = if rng.gen_bool(0.05) {
                0
            } else if rng.gen_bool(0.5) {
                rng.gen_range(id.saturating_sub(6).max(1)..id)
            } else {
                rng.gen_range(1..id)
            };
            AigEdge::new(node, rng.gen_bool(0.5))
        };
        let fanin0 = pick(&mut rng);
        let fanin1 = if rng.gen_bool(0.1) {
            AigEdge::new(fanin0.node, rng.gen_bool(0.5))
        } else {
            pick(&mut rng)
        };
        aig.new_and(id, fanin0, fanin1).unwrap();
    }
    let first_output = first_and + n_ands;
    let lo = first_output - n_ands.clamp(1, 8);
    for id in first_output..first_output + n_outputs {
        let node = rng.gen_range(lo..first_output);
        aig.new_output(id, AigEdge::new(node, rng.gen_bool(0.5)))
            .unwrap();
    }
    aig
}

/// Output values for every assignment of the inputs (at most 12), 64 assignments per word.
///
/// Assignment `w * 64 + k` is bit `k` of word `w`, input `i` takes bit `i` of the assignment.
pub(crate) fn truth_tables(aig: &mut Aig) -> Vec<Vec<u64>> {
    let inputs = aig.get_inputs().to_vec();
    assert!(inputs.len() <= 12);
    let n_words = 1usize << inputs.len().saturating_sub(6);
    let order = aig.dfs_order();
    let mut res = Vec::with_capacity(n_words);
    for w in 0..n_words {
        for (i, &id) in inputs.iter().enumerate() {
            let pattern = match MASKS.get(i) {
                Some(&mask) => mask,
                None if (w >> (i - 6)) & 1 == 1 => u64::MAX,
                None => 0,
            };
            aig.set_input_pattern(id, pattern).unwrap();
        }
        aig.simulate(&order);
        res.push(outputs(aig));
    }
    res
}

fn outputs(aig: &Aig) -> Vec<u64> {
    aig.get_outputs()
        .iter()
        .map(|&id: &NodeId| aig.node(id).unwrap().get_pattern())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn random_aig_test() {
        for seed in 0..10 {
            let aig = random_aig(seed, 4, 30, 3);
            aig.check_integrity().unwrap();
            assert_eq!(aig.num_ands(), 30);
            assert_eq!(aig.num_outputs(), 3);
        }
        assert_eq!(random_aig(3, 4, 30, 3), random_aig(3, 4, 30, 3));
    }

    #[test]
    fn truth_tables_test() {
        let mut aig = Aig::from_file("assets/circuits/half_adder.aag").unwrap();
        let tt = truth_tables(&mut aig);
        // x = 1010, y = 1100 on the 4 first assignments
        assert_eq!(tt.len(), 1);
        assert_eq!(tt[0][0] & 0xF, 0b0110);
        assert_eq!(tt[0][1] & 0xF, 0b1000);
    }
}
