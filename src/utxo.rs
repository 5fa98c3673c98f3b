//! Bookkeeping of which transactions have claimed which outputs

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ledger::Ledger,
    transaction::{OutputRef, Transaction, TxID},
};

/// Every claim made on a single output. The first claimant is the legitimate
/// owner of the spend; any later, distinct claimant is a double spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub first: TxID,
    /// All claimants in the order they were recorded, including `first`.
    pub all: Vec<TxID>,
}

impl Claims {
    fn new(first: TxID) -> Self {
        Claims { first, all: vec![first] }
    }

    /// Returns true if a transaction other than [`Claims::first`] has claimed
    /// this output.
    pub fn is_contested(&self) -> bool {
        self.all.iter().any(|&id| id != self.first)
    }
}

/// A claim on an output which conflicts with the claim already recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleSpend {
    pub output: OutputRef,
    /// First claimant recorded by the tracker which found the conflict.
    pub first_claimant: TxID,
    /// The transaction whose claim conflicts with `first_claimant`.
    pub conflicting: TxID,
}

impl std::fmt::Display for DoubleSpend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "output {} spent by transaction {} and transaction {}",
            self.output, self.first_claimant, self.conflicting
        )
    }
}

/// Maps spent output references to the transactions which claimed them.
/// Entries are created on the first claim and only ever appended to.
#[derive(Debug, Clone, Default)]
pub struct UtxoTracker {
    claims: HashMap<OutputRef, Claims>,
}

impl UtxoTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every input of every transaction as a claim by that
    /// transaction.
    pub fn record_spends(&mut self, transactions: &[Transaction]) {
        for tx in transactions {
            for &input in &tx.inputs {
                self.claims
                    .entry(input)
                    .and_modify(|claims| claims.all.push(tx.id))
                    .or_insert_with(|| Claims::new(tx.id));
                debug!(output = %input, tx = %tx.id, "recorded spend");
            }
        }
    }

    /// Checks the transactions of `other` against the claims recorded here,
    /// in block, transaction, then input order.
    ///
    /// Returns the first input which is already claimed here by a different
    /// transaction. Only `other`'s transactions are checked against this
    /// tracker; claims made on `other` but not here are never compared.
    pub fn conflicts_with(&self, other: &Ledger) -> Option<DoubleSpend> {
        other
            .blocks()
            .iter()
            .flat_map(|block| block.transactions())
            .flat_map(|tx| tx.inputs.iter().map(move |&input| (tx.id, input)))
            .find_map(|(id, input)| {
                self.claims.get(&input).and_then(|claims| {
                    (claims.first != id).then_some(DoubleSpend {
                        output: input,
                        first_claimant: claims.first,
                        conflicting: id,
                    })
                })
            })
    }

    /// Returns true if no transaction in `other` conflicts with the claims
    /// recorded here.
    #[inline]
    pub fn is_consistent_with(&self, other: &Ledger) -> bool {
        self.conflicts_with(other).is_none()
    }

    /// Outputs claimed by two or more distinct transactions within this
    /// tracker, in ascending order.
    pub fn internal_conflicts(&self) -> Vec<OutputRef> {
        let mut outputs: Vec<_> = self
            .claims
            .iter()
            .filter(|(_, claims)| claims.is_contested())
            .map(|(&output, _)| output)
            .collect();
        outputs.sort_unstable();

        outputs
    }

    #[inline]
    pub fn claims(&self, output: OutputRef) -> Option<&Claims> {
        self.claims.get(&output)
    }

    /// Number of distinct outputs claimed.
    #[inline]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{block::Block, ledger::Ledger, miner::Miner};

    fn ledger_with(txs: Vec<Vec<Transaction>>) -> Ledger {
        let miner = Miner::new(0.into());
        let mut ledger = Ledger::new();
        for block_txs in txs {
            let block = miner.mine(ledger.tip(), block_txs);
            ledger.append(block).expect("block mined on tip");
        }

        ledger
    }

    #[test]
    fn first_claimant_is_kept() {
        let mut tracker = UtxoTracker::new();
        tracker.record_spends(&[Transaction::spending(1.into(), 10.into())]);
        tracker.record_spends(&[Transaction::spending(2.into(), 10.into())]);

        let claims = tracker.claims(10.into()).unwrap();
        assert_eq!(claims.first, 1.into());
        assert_eq!(claims.all, vec![1.into(), 2.into()]);
        assert!(claims.is_contested());
        assert_eq!(tracker.internal_conflicts(), vec![10.into()]);
    }

    #[test]
    fn repeated_claim_by_same_transaction_is_not_contested() {
        let mut tracker = UtxoTracker::new();
        let tx = Transaction::spending(1.into(), 10.into());
        tracker.record_spends(&[tx.clone(), tx]);

        assert!(!tracker.claims(10.into()).unwrap().is_contested());
        assert!(tracker.internal_conflicts().is_empty());
    }

    #[test]
    fn conflict_reported_for_distinct_claimant() {
        let public =
            ledger_with(vec![vec![Transaction::spending(1.into(), 10.into())]]);
        let private = ledger_with(vec![
            vec![Transaction::spending(5.into(), 11.into())],
            vec![Transaction::spending(2.into(), 10.into())],
        ]);

        let conflict = public.tracker().conflicts_with(&private);
        assert_eq!(
            conflict,
            Some(DoubleSpend {
                output: 10.into(),
                first_claimant: 1.into(),
                conflicting: 2.into(),
            })
        );
        assert!(!public.tracker().is_consistent_with(&private));
    }

    #[test]
    fn first_conflict_wins() {
        let public = ledger_with(vec![vec![
            Transaction::spending(1.into(), 10.into()),
            Transaction::spending(2.into(), 20.into()),
        ]]);
        let private = ledger_with(vec![
            vec![Transaction::spending(3.into(), 20.into())],
            vec![Transaction::spending(4.into(), 10.into())],
        ]);

        let conflict = public.tracker().conflicts_with(&private).unwrap();
        assert_eq!(conflict.output, 20.into());
        assert_eq!(conflict.conflicting, 3.into());
    }

    #[test]
    fn no_conflict_for_disjoint_or_identical_claims() {
        let shared = Transaction::spending(1.into(), 10.into());
        let public = ledger_with(vec![
            vec![shared.clone()],
            vec![Transaction::spending(2.into(), 20.into())],
        ]);
        let private = ledger_with(vec![
            vec![shared],
            vec![Transaction::spending(3.into(), 30.into())],
        ]);

        assert_eq!(public.tracker().conflicts_with(&private), None);
        assert_eq!(private.tracker().conflicts_with(&public), None);
    }

    #[test]
    fn only_the_other_ledger_is_scanned() {
        // Duplicate spends inside `public` are not reported when comparing
        // against an empty ledger.
        let public = ledger_with(vec![
            vec![Transaction::spending(1.into(), 10.into())],
            vec![Transaction::spending(2.into(), 10.into())],
        ]);

        assert_eq!(public.tracker().conflicts_with(&Ledger::new()), None);
        assert_eq!(public.tracker().internal_conflicts(), vec![10.into()]);
    }

    #[test]
    fn genesis_base_contributes_no_claims() {
        let tracker = UtxoTracker::new();
        let ledger = Ledger::forked_from(Block::genesis());

        assert!(tracker.is_empty());
        assert!(tracker.is_consistent_with(&ledger));
    }
}
