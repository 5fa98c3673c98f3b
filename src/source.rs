/*!
Sources of transaction content

The simulator never invents transactions itself: every transaction id and
output reference comes from a [`TransactionSource`]. Replacing the source
with a deterministic one makes a simulation run fully reproducible.

# Built-In Sources
- [`RandomTransactions`]: ids and references drawn from a seeded RNG, never
  repeating within one run.
- [`SequentialTransactions`]: ids and references handed out in increasing
  order.
*/

use std::{collections::HashSet, fmt::Debug, ops::RangeInclusive};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::transaction::{OutputRef, Transaction, TxID};

/// The kind of block content requested from a [`TransactionSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    /// Filler transactions mined by the attacker on the private chain.
    Fake,
    /// Ordinary transactions mined on the public chain.
    Honest,
}

/// Generator of transaction content for mined blocks.
pub trait TransactionSource: Debug + dyn_clone::DynClone + Send + Sync {
    /// Returns the name of this source.
    fn name(&self) -> String;

    /// Returns the transactions for one block of the given kind.
    fn transactions(&mut self, kind: TxKind) -> Vec<Transaction>;

    /// Returns a transaction id which has not been returned before.
    fn tx_id(&mut self) -> TxID;

    /// Returns an output reference which has not been returned before.
    fn output_ref(&mut self) -> OutputRef;

    /// Restarts this source from `seed`. Called once by
    /// [`SimulatorBuilder::build`](crate::simulation::SimulatorBuilder::build)
    /// before any other trait methods.
    fn reseed(&mut self, seed: u64);
}

dyn_clone::clone_trait_object!(TransactionSource);

/// Draws transaction ids and output references uniformly from fixed ranges,
/// without repeats.
///
/// Once a range is exhausted, values continue sequentially past its end, then
/// downwards from below its start when the end is `u64::MAX`.
#[derive(Debug, Clone)]
pub struct RandomTransactions {
    rng: StdRng,
    tx_ids: RangeInclusive<u64>,
    outputs: RangeInclusive<u64>,
    issued_ids: HashSet<u64>,
    issued_outputs: HashSet<u64>,
}

impl RandomTransactions {
    pub const DEFAULT_TX_IDS: RangeInclusive<u64> = 1000..=9999;
    pub const DEFAULT_OUTPUTS: RangeInclusive<u64> = 100..=999;

    pub fn new() -> Self {
        Self::with_ranges(Self::DEFAULT_TX_IDS, Self::DEFAULT_OUTPUTS)
    }

    pub fn with_ranges(
        tx_ids: RangeInclusive<u64>,
        outputs: RangeInclusive<u64>,
    ) -> Self {
        assert!(!tx_ids.is_empty(), "transaction id range is empty");
        assert!(!outputs.is_empty(), "output range is empty");

        RandomTransactions {
            rng: StdRng::seed_from_u64(0),
            tx_ids,
            outputs,
            issued_ids: HashSet::new(),
            issued_outputs: HashSet::new(),
        }
    }

    fn draw(
        rng: &mut StdRng,
        range: &RangeInclusive<u64>,
        issued: &mut HashSet<u64>,
    ) -> u64 {
        let span = u128::from(*range.end()) - u128::from(*range.start()) + 1;
        let count = issued.len() as u128;
        if count >= span {
            let past = count - span;
            let above = u128::from(u64::MAX - range.end());
            let next = if past < above {
                range.end() + 1 + past as u64
            } else {
                range.start() - 1 - (past - above) as u64
            };
            issued.insert(next);
            return next;
        }

        loop {
            let value = rng.gen_range(range.clone());
            if issued.insert(value) {
                return value;
            }
        }
    }
}

impl Default for RandomTransactions {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSource for RandomTransactions {
    fn name(&self) -> String {
        "Random".into()
    }

    fn transactions(&mut self, _kind: TxKind) -> Vec<Transaction> {
        vec![Transaction::spending(self.tx_id(), self.output_ref())]
    }

    fn tx_id(&mut self) -> TxID {
        Self::draw(&mut self.rng, &self.tx_ids, &mut self.issued_ids).into()
    }

    fn output_ref(&mut self) -> OutputRef {
        Self::draw(&mut self.rng, &self.outputs, &mut self.issued_outputs)
            .into()
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.issued_ids.clear();
        self.issued_outputs.clear();
    }
}

/// Hands out transaction ids and output references in increasing order,
/// starting from the beginning of the [`RandomTransactions`] default ranges.
#[derive(Debug, Clone, Default)]
pub struct SequentialTransactions {
    next_id: u64,
    next_output: u64,
}

impl SequentialTransactions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionSource for SequentialTransactions {
    fn name(&self) -> String {
        "Sequential".into()
    }

    fn transactions(&mut self, _kind: TxKind) -> Vec<Transaction> {
        vec![Transaction::spending(self.tx_id(), self.output_ref())]
    }

    fn tx_id(&mut self) -> TxID {
        self.next_id += 1;
        (RandomTransactions::DEFAULT_TX_IDS.start() + self.next_id - 1).into()
    }

    fn output_ref(&mut self) -> OutputRef {
        self.next_output += 1;
        (RandomTransactions::DEFAULT_OUTPUTS.start() + self.next_output - 1)
            .into()
    }

    fn reseed(&mut self, _seed: u64) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn random_source_never_repeats() {
        let mut source = RandomTransactions::with_ranges(1..=20, 1..=5);
        source.reseed(7);

        let ids: HashSet<_> = (0..20).map(|_| source.tx_id()).collect();
        assert_eq!(ids.len(), 20);
        assert!(ids.iter().all(|id| (1..=20).contains(&id.get())));

        let outputs: Vec<_> =
            (0..8).map(|_| source.output_ref().get()).collect();
        let mut sorted = outputs.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&outputs[5..], &[6, 7, 8]);
    }

    #[test]
    fn random_source_accepts_full_width_ranges() {
        let mut source = RandomTransactions::with_ranges(0..=u64::MAX, 1..=5);
        source.reseed(1);

        let ids: HashSet<_> = (0..50).map(|_| source.tx_id()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn exhausted_range_ending_at_max_continues_below_start() {
        let mut source =
            RandomTransactions::with_ranges(u64::MAX - 1..=u64::MAX, 1..=5);
        source.reseed(3);

        let mut ids: Vec<_> = (0..4).map(|_| source.tx_id().get()).collect();
        ids.sort_unstable();
        assert_eq!(
            ids,
            vec![u64::MAX - 3, u64::MAX - 2, u64::MAX - 1, u64::MAX]
        );
    }

    #[test]
    fn random_source_replays_after_reseed() {
        let mut source = RandomTransactions::new();
        source.reseed(99);
        let first: Vec<_> =
            (0..10).map(|_| source.transactions(TxKind::Honest)).collect();

        source.reseed(99);
        let second: Vec<_> =
            (0..10).map(|_| source.transactions(TxKind::Honest)).collect();

        assert_eq!(first, second);
        assert!(first.iter().all(|txs| txs.len() == 1
            && txs[0].inputs.len() == 1
            && RandomTransactions::DEFAULT_OUTPUTS
                .contains(&txs[0].inputs[0].get())));
    }

    #[test]
    fn sequential_source_counts_up() {
        let mut source = SequentialTransactions::new();

        let txs = source.transactions(TxKind::Fake);
        assert_eq!(txs, vec![Transaction::spending(1000.into(), 100.into())]);
        assert_eq!(source.tx_id(), 1001.into());
        assert_eq!(source.output_ref(), 101.into());

        source.reseed(0);
        assert_eq!(source.tx_id(), 1000.into());
    }

    #[test]
    fn boxed_sources_clone() {
        let mut source: Box<dyn TransactionSource> =
            Box::new(SequentialTransactions::new());
        source.tx_id();

        let mut copy = source.clone();
        assert_eq!(copy.tx_id(), source.tx_id());
        assert_eq!(copy.name(), "Sequential");
    }
}
