//! Bit-parallel simulation: every gate carries 64 patterns in a `u64`, bit `k` of each
//! input pattern being the value of that input in the `k`-th assignment.
//!
//! Simulation is what builds and refines the candidate classes of [`crate::fec`]:
//! [`Aig::random_sim`] draws random input words until classes stop splitting, and
//! [`Aig::file_sim`] replays assignments read from a pattern file.
//!
//! ```rust
//! use fraig::{Aig, sim::SimConfig};
//!
//! let mut aig = Aig::from_file("assets/circuits/redundant.aag").unwrap();
//! let report = aig.random_sim(&SimConfig::default().with_seed(7), None).unwrap();
//! assert!(report.patterns > 0);
//! ```

use std::{
    collections::VecDeque,
    io::{BufRead, Write},
    time::{Duration, Instant},
};

use log::{debug, info};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Aig, AigError, NodeId, Result, SimError};

/// Number of patterns simulated at once.
pub const BATCH: usize = 64;

/// Configuration for random simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Wall-clock budget, checked after each round.
    pub time_budget: Duration,
    /// Number of rounds over which progress is measured.
    pub stall_window: usize,
    /// Simulation stops once the number of classes moved by less than this over the window.
    pub stall_threshold: usize,
    /// Maximum number of 64-pattern rounds (None for no limit).
    pub max_rounds: Option<usize>,
    /// Random seed (None for random)
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Set the wall-clock budget.
    pub fn with_time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = time_budget;
        self
    }

    /// Set the stall heuristic: stop when the number of classes moved by less than
    /// `threshold` during the last `window` rounds.
    pub fn with_stall(mut self, window: usize, threshold: usize) -> Self {
        self.stall_window = window;
        self.stall_threshold = threshold;
        self
    }

    /// Set the maximum number of rounds.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            time_budget: Duration::from_secs(15),
            stall_window: 320,
            stall_threshold: 5,
            max_rounds: None,
            seed: None,
        }
    }
}

/// What a simulation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimReport {
    /// Number of input assignments simulated.
    pub patterns: usize,
    /// Number of candidate classes left.
    pub classes: usize,
}

fn io_error(e: std::io::Error) -> AigError {
    SimError::IoError(e.to_string()).into()
}

impl Aig {
    /// Evaluates every gate of `order` from the patterns of its fanins.
    ///
    /// `order` must list fanins first, see [`Aig::dfs_order`]. Inputs keep their pattern,
    /// the constant and undefined gates are all zeros.
    pub fn simulate(&mut self, order: &[NodeId]) {
        for &id in order {
            let Some(node) = self.get_node(id) else {
                continue;
            };
            let value = node.eval(|edge| {
                let p = self.get_node(edge.node).map(|n| n.pattern).unwrap_or_default();
                if edge.complement { !p } else { p }
            });
            if let Ok(node) = self.node_mut(id) {
                node.pattern = value;
            }
        }
    }

    /// Writes the first `n` simulated assignments, one line each: input bits in declaration
    /// order, a space, then output bits.
    fn log_patterns(&self, n: usize, log: &mut dyn Write) -> Result<()> {
        let patterns = |ids: &[NodeId]| -> Vec<u64> {
            ids.iter()
                .map(|&id| self.get_node(id).map(|n| n.pattern).unwrap_or_default())
                .collect()
        };
        let inputs = patterns(self.get_inputs());
        let outputs = patterns(self.get_outputs());
        let bits = |words: &[u64], k: usize| -> String {
            words
                .iter()
                .map(|w| if (w >> k) & 1 == 1 { '1' } else { '0' })
                .collect()
        };
        for k in 0..n {
            writeln!(log, "{} {}", bits(&inputs, k), bits(&outputs, k)).map_err(io_error)?;
        }
        Ok(())
    }

    /// Starts a candidate partition if none exists. Returns true if it did.
    fn ensure_partition(&mut self) -> bool {
        if self.partition.is_some() {
            return false;
        }
        self.init_partition();
        true
    }

    /// Simulates rounds of 64 random assignments, refining candidate classes after each one.
    ///
    /// Stops when no class is left, when the time budget or the round limit is exhausted,
    /// or when classes stopped splitting (see [`SimConfig::with_stall`]).
    pub fn random_sim(
        &mut self,
        config: &SimConfig,
        mut log: Option<&mut dyn Write>,
    ) -> Result<SimReport> {
        let order = self.dfs_order();
        self.ensure_partition();
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!("random simulation with seed {}", seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let start = Instant::now();
        let inputs = self.get_inputs().to_vec();
        let mut history: VecDeque<usize> = VecDeque::with_capacity(config.stall_window + 1);
        let mut classes = self.get_partition().map_or(0, |p| p.len());
        history.push_back(classes);
        let mut rounds = 0;

        while classes > 0 {
            if config.max_rounds.is_some_and(|max| rounds >= max) {
                break;
            }
            for &id in &inputs {
                self.set_input_pattern(id, rng.next_u64())?;
            }
            self.simulate(&order);
            if let Some(log) = log.as_deref_mut() {
                self.log_patterns(BATCH, log)?;
            }
            classes = self.refine_partition();
            rounds += 1;

            history.push_back(classes);
            if history.len() > config.stall_window + 1 {
                history.pop_front();
            }
            if start.elapsed() >= config.time_budget {
                debug!("random simulation ran out of time");
                break;
            }
            if rounds >= config.stall_window
                && history.front().map_or(0, |&old| old.abs_diff(classes))
                    < config.stall_threshold
            {
                debug!("random simulation stalled after {} rounds", rounds);
                break;
            }
        }

        let report = SimReport {
            patterns: rounds * BATCH,
            classes,
        };
        info!("{} patterns simulated, {} candidate classes", report.patterns, classes);
        Ok(report)
    }

    /// Simulates the assignments of a pattern file, one per line, refining candidate classes
    /// after every 64 of them (and after the last, partial, batch).
    ///
    /// Each non-empty line holds one `0`/`1` character per input, in declaration order.
    /// A malformed line aborts the call: batches already simulated are kept, and a partition
    /// started by this call is dropped.
    pub fn file_sim(
        &mut self,
        reader: impl BufRead,
        mut log: Option<&mut dyn Write>,
    ) -> Result<SimReport> {
        let order = self.dfs_order();
        let fresh = self.ensure_partition();
        let res = self.file_sim_batches(&order, reader, &mut log);
        if fresh && !matches!(res, Ok(n) if n > 0) {
            self.reset_partition();
        }
        let patterns = res?;

        let classes = self.get_partition().map_or(0, |p| p.len());
        info!("{} patterns simulated, {} candidate classes", patterns, classes);
        Ok(SimReport { patterns, classes })
    }

    fn file_sim_batches(
        &mut self,
        order: &[NodeId],
        reader: impl BufRead,
        log: &mut Option<&mut dyn Write>,
    ) -> Result<usize> {
        let inputs = self.get_inputs().to_vec();
        let mut words = vec![0u64; inputs.len()];
        let mut count = 0;
        let mut pending = 0;

        for (k, line) in reader.lines().enumerate() {
            let line = line.map_err(io_error)?;
            let pattern = line.trim();
            if pattern.is_empty() {
                continue;
            }
            if pattern.len() != inputs.len() {
                return Err(SimError::MalformedPattern {
                    line: k + 1,
                    pattern: pattern.to_string(),
                    reason: format!(
                        "length ({}) does not match the number of inputs ({})",
                        pattern.len(),
                        inputs.len()
                    ),
                }
                .into());
            }
            for (word, c) in words.iter_mut().zip(pattern.chars()) {
                match c {
                    '0' => (),
                    '1' => *word |= 1u64 << pending,
                    _ => {
                        return Err(SimError::MalformedPattern {
                            line: k + 1,
                            pattern: pattern.to_string(),
                            reason: format!("contains a non-0/1 character ('{}')", c),
                        }
                        .into());
                    }
                }
            }
            pending += 1;
            count += 1;
            if pending == BATCH {
                self.flush_batch(order, &inputs, &mut words, pending, log)?;
                pending = 0;
            }
        }
        if pending > 0 {
            self.flush_batch(order, &inputs, &mut words, pending, log)?;
        }
        Ok(count)
    }

    /// Simulates the `n` assignments packed in `words` and clears them.
    fn flush_batch(
        &mut self,
        order: &[NodeId],
        inputs: &[NodeId],
        words: &mut [u64],
        n: usize,
        log: &mut Option<&mut dyn Write>,
    ) -> Result<()> {
        for (&id, word) in inputs.iter().zip(words.iter_mut()) {
            self.set_input_pattern(id, *word)?;
            *word = 0;
        }
        self.simulate(order);
        if let Some(log) = log.as_deref_mut() {
            self.log_patterns(n, log)?;
        }
        self.refine_partition();
        Ok(())
    }
}
