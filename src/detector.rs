/*!
Safe-mode detection of majority attacks and double spends

Two independent checks are available:
- [`SafeModeDetector::majority_run`] is a heuristic: it flags a chain whose
  most recent blocks were all produced by a single miner. A flag is grounds
  for suspicion, not proof of an attack.
- [`SafeModeDetector::double_spend`] is authoritative: it reports an output
  claimed on the private chain by a different transaction than the one which
  first claimed it on the public chain.

Only the authoritative check decides [`DetectionReport::is_safe`]. The two
checks can disagree: a short private chain containing a double spend is never
flagged by the heuristic.
*/

use std::num::NonZeroUsize;

use tracing::{info, warn};

use crate::{
    ledger::Ledger,
    miner::MinerID,
    simulation::AttackSimulator,
    transaction::OutputRef,
    utxo::DoubleSpend,
};

/// Inspects the public and private ledgers of an [`AttackSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeModeDetector {
    /// Number of consecutive blocks by one miner needed to suspect a
    /// majority attack.
    window: NonZeroUsize,
}

/// Findings of a [`SafeModeDetector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionReport {
    /// Miner which produced the entire recent window of the private chain.
    pub suspected_majority: Option<MinerID>,
    /// First conflicting claim found between the chains.
    pub double_spend: Option<DoubleSpend>,
    /// Outputs claimed more than once within the public chain or within the
    /// private chain. Reported for diagnostics only.
    pub internal_conflicts: Vec<OutputRef>,
    /// True if the private chain is longer than the public chain.
    pub private_overtakes: bool,
}

impl DetectionReport {
    /// The system is safe unless a double spend between the chains was found.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.double_spend.is_none()
    }
}

impl SafeModeDetector {
    pub const DEFAULT_WINDOW: NonZeroUsize = match NonZeroUsize::new(6) {
        Some(window) => window,
        None => unreachable!(),
    };

    pub fn new(window: NonZeroUsize) -> Self {
        SafeModeDetector { window }
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window.get()
    }

    /// Returns the miner which mined each of the last
    /// [`window`](Self::window) blocks of `ledger`, if there is one. Ledgers
    /// shorter than the window are never flagged.
    pub fn majority_run(&self, ledger: &Ledger) -> Option<MinerID> {
        if ledger.len() < self.window() {
            return None;
        }

        let tail = ledger.tail(self.window());
        let first = tail.first()?.miner()?;
        tail.iter()
            .all(|block| block.miner() == Some(first))
            .then_some(first)
    }

    /// Checks the transactions of `private` against the claims recorded on
    /// `public`.
    pub fn double_spend(
        &self,
        public: &Ledger,
        private: &Ledger,
    ) -> Option<DoubleSpend> {
        public.tracker().conflicts_with(private)
    }

    /// Runs both checks on the ledgers of `sim`.
    pub fn detect(&self, sim: &AttackSimulator) -> DetectionReport {
        let (public, private) = (sim.public(), sim.private());

        let suspected_majority = self.majority_run(private);
        if let Some(miner) = suspected_majority {
            warn!(
                miner = %miner,
                blocks = self.window(),
                "51% attack suspected: one miner created the entire window"
            );
        }

        let mut internal_conflicts = public.tracker().internal_conflicts();
        internal_conflicts.extend(private.tracker().internal_conflicts());
        internal_conflicts.sort_unstable();
        internal_conflicts.dedup();
        for output in &internal_conflicts {
            warn!(output = %output, "output spent twice within one chain");
        }

        let double_spend = self.double_spend(public, private);
        match &double_spend {
            Some(conflict) => {
                warn!(%conflict, "double spending detected, attack rejected")
            }
            None => {
                info!("no double spending detected, system is in safe mode")
            }
        }

        DetectionReport {
            suspected_majority,
            double_spend,
            internal_conflicts,
            private_overtakes: private.len() > public.len(),
        }
    }
}

impl Default for SafeModeDetector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl std::fmt::Display for DetectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(miner) = self.suspected_majority {
            writeln!(
                f,
                "51% attack suspected: Miner {} created the most recent blocks \
                 of the private chain.",
                miner
            )?;
        }
        if self.private_overtakes {
            writeln!(f, "The private chain is longer than the public chain.")?;
        }
        for output in &self.internal_conflicts {
            writeln!(f, "Output {} was spent twice within one chain.", output)?;
        }

        match &self.double_spend {
            Some(conflict) => write!(
                f,
                "Double spending detected! {}. Attack rejected.",
                conflict
            ),
            None => write!(f, "No attack detected. System is in safe mode."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        miner::Miner,
        transaction::{Transaction, TxID},
    };

    fn mine_by(ledger: &mut Ledger, miners: &[usize]) {
        for &id in miners {
            let block = Miner::new(id.into()).mine(ledger.tip(), vec![]);
            ledger.append(block).unwrap();
        }
    }

    fn spend(ledger: &mut Ledger, id: u64, output: u64) {
        let tx = Transaction::spending(TxID::from(id), output.into());
        let block = Miner::new(0.into()).mine(ledger.tip(), vec![tx]);
        ledger.append(block).unwrap();
    }

    #[test]
    fn majority_run_needs_full_window() {
        let detector = SafeModeDetector::default();
        let mut ledger = Ledger::new();

        mine_by(&mut ledger, &[2, 2, 2, 2, 2]);
        assert_eq!(detector.majority_run(&ledger), None);

        mine_by(&mut ledger, &[2]);
        assert_eq!(detector.majority_run(&ledger), Some(2.into()));
    }

    #[test]
    fn majority_run_only_checks_the_tail() {
        let detector = SafeModeDetector::default();
        let mut ledger = Ledger::new();

        mine_by(&mut ledger, &[1, 2, 2, 2, 2, 2, 2]);
        assert_eq!(detector.majority_run(&ledger), Some(2.into()));

        mine_by(&mut ledger, &[3]);
        assert_eq!(detector.majority_run(&ledger), None);
    }

    #[test]
    fn custom_window() {
        let window = NonZeroUsize::new(3).unwrap();
        let detector = SafeModeDetector::new(window);
        let mut ledger = Ledger::new();
        mine_by(&mut ledger, &[4, 4, 4]);

        assert_eq!(detector.window(), 3);
        assert_eq!(detector.majority_run(&ledger), Some(4.into()));
    }

    #[test]
    fn default_window_is_six_blocks() {
        assert_eq!(SafeModeDetector::default().window(), 6);
    }

    #[test]
    fn double_spend_between_ledgers() {
        let detector = SafeModeDetector::default();
        let mut public = Ledger::new();
        let mut private = Ledger::new();
        spend(&mut public, 1, 10);
        spend(&mut private, 2, 10);

        let conflict = detector.double_spend(&public, &private).unwrap();
        assert_eq!(conflict.output, 10.into());

        let mut consistent = Ledger::new();
        spend(&mut consistent, 1, 10);
        spend(&mut consistent, 3, 30);
        assert_eq!(detector.double_spend(&public, &consistent), None);
    }

    #[test]
    fn report_display() {
        let safe = DetectionReport {
            suspected_majority: Some(2.into()),
            double_spend: None,
            internal_conflicts: vec![],
            private_overtakes: true,
        };
        let text = safe.to_string();
        assert!(text.starts_with("51% attack suspected: Miner 2"));
        assert!(text.ends_with("System is in safe mode."));

        let unsafe_report = DetectionReport {
            suspected_majority: None,
            double_spend: Some(DoubleSpend {
                output: 512.into(),
                first_claimant: 4000.into(),
                conflicting: 5000.into(),
            }),
            internal_conflicts: vec![],
            private_overtakes: false,
        };
        assert!(!unsafe_report.is_safe());
        assert_eq!(
            unsafe_report.to_string(),
            "Double spending detected! output 512 spent by transaction 4000 \
             and transaction 5000. Attack rejected."
        );
    }
}
