//! Running attack scenarios on a pair of competing ledgers

use rand::rngs::StdRng;
use tracing::info;

use crate::{
    detector::{DetectionReport, SafeModeDetector},
    ledger::{AppendError, Ledger},
    miner::{Miner, MinerID},
    scenario::{
        AttackPlan, Scenario, ScenarioParseError, ATTACK_HONEST_BLOCKS,
        HONEST_RUN_BLOCKS,
    },
    selection::MinerSelection,
    source::{TransactionSource, TxKind},
    transaction::{OutputRef, Transaction},
};

pub mod builder;
pub mod trials;

pub use builder::{SimulatorBuildError, SimulatorBuilder};
pub use trials::{TrialOutput, Trials};

/// A network of miners extending a public chain, one of which may secretly
/// extend a private chain of its own.
///
/// Scenarios are run with [`AttackSimulator::run`]. Both ledgers and the
/// contested output persist between runs on the same instance, so an honest
/// run following a double-spend attack still re-spends the contested output.
///
/// # Reproducibility
/// All randomness comes from an RNG seeded with [`AttackSimulator::seed`] and
/// from the configured [`TransactionSource`], which is reseeded from the same
/// RNG when the simulator is built. Two simulators built with the same seed
/// and source produce identical ledgers.
#[derive(Debug, Clone)]
pub struct AttackSimulator {
    public: Ledger,
    private: Ledger,
    miners: Vec<Miner>,
    attacker: Miner,
    selection: MinerSelection,
    /// Output spent by both chains in a double-spend attack. Allocated on
    /// first use and reused afterwards.
    contested: Option<OutputRef>,
    /// Number of honest blocks mined so far.
    honest_mined: usize,
    seed: u64,
    rng: StdRng,
    source: Box<dyn TransactionSource>,
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("block could not be appended")]
    AppendError(#[from] AppendError),
    #[error("simulator could not be built")]
    BuildError(#[from] SimulatorBuildError),
    #[error(transparent)]
    InvalidSelection(#[from] ScenarioParseError),
    #[error("no miner available to mine an honest block")]
    NoMinerSelected,
}

impl AttackSimulator {
    pub fn builder() -> SimulatorBuilder {
        SimulatorBuilder::new()
    }

    /// Runs the scenario chosen by the menu token `choice`, then inspects the
    /// ledgers with `detector`.
    ///
    /// An unrecognized token fails with [`SimulationError::InvalidSelection`]
    /// before anything is mined.
    pub fn simulate(
        &mut self,
        choice: &str,
        detector: &SafeModeDetector,
    ) -> Result<DetectionReport, SimulationError> {
        let scenario: Scenario = choice.parse()?;
        self.run(scenario)?;

        Ok(detector.detect(self))
    }

    /// Executes `scenario` to completion.
    pub fn run(&mut self, scenario: Scenario) -> Result<(), SimulationError> {
        match scenario.attack_plan() {
            None => {
                info!("no attacker in the network, miners mining honestly");
                self.mine_honest(HONEST_RUN_BLOCKS)
            }
            Some(plan) => {
                info!(
                    attacker = %self.attacker.id(),
                    "attacker is performing a 51% attack"
                );
                self.mine_private(plan)?;
                info!("honest miners are mining on the public chain");
                self.mine_honest(ATTACK_HONEST_BLOCKS)
            }
        }
    }

    /// Extends the public chain by `count` blocks, each mined by a miner
    /// chosen with the configured [`MinerSelection`].
    ///
    /// If a contested output has been recorded, the first block spends it
    /// with a fresh transaction.
    pub fn mine_honest(&mut self, count: usize) -> Result<(), SimulationError> {
        for i in 0..count {
            let transactions = match self.contested {
                Some(output) if i == 0 => {
                    info!(
                        output = %output,
                        "honest miners spending the same output as the attacker"
                    );
                    vec![Transaction::spending(self.source.tx_id(), output)]
                }
                _ => self.source.transactions(TxKind::Honest),
            };

            let miner = *self
                .selection
                .choose(&self.miners, self.honest_mined, &mut self.rng)
                .ok_or(SimulationError::NoMinerSelected)?;
            let block = miner.mine(self.public.tip(), transactions);
            self.public.append(block)?;
            self.honest_mined += 1;
        }

        Ok(())
    }

    /// Has the attacker extend the private chain according to `plan`.
    ///
    /// An empty private chain is first forked from the current public tip.
    pub fn mine_private(
        &mut self,
        plan: AttackPlan,
    ) -> Result<(), SimulationError> {
        if self.private.is_empty() {
            self.private = Ledger::forked_from(self.public.tip().clone());
        }
        info!(
            attacker = %self.attacker.id(),
            blocks = plan.private_blocks(),
            "attacker starts creating private chain"
        );

        for i in 0..plan.private_blocks() {
            let transactions = if i == 0 && plan.double_spend {
                info!("attacker is performing double spending");
                vec![self.double_spend_transaction()]
            } else {
                self.source.transactions(TxKind::Fake)
            };

            let block = self.attacker.mine(self.private.tip(), transactions);
            self.private.append(block)?;
        }

        Ok(())
    }

    /// Returns a fresh transaction spending the contested output, allocating
    /// the output from the source if none has been recorded yet.
    pub fn double_spend_transaction(&mut self) -> Transaction {
        let source = &mut self.source;
        let output = *self.contested.get_or_insert_with(|| source.output_ref());

        Transaction::spending(self.source.tx_id(), output)
    }

    #[inline]
    pub fn public(&self) -> &Ledger {
        &self.public
    }

    #[inline]
    pub fn private(&self) -> &Ledger {
        &self.private
    }

    #[inline]
    pub fn miners(&self) -> &[Miner] {
        &self.miners
    }

    #[inline]
    pub fn attacker(&self) -> MinerID {
        self.attacker.id()
    }

    /// The output double spent by the attacker, if one has been chosen.
    #[inline]
    pub fn contested(&self) -> Option<OutputRef> {
        self.contested
    }

    /// Seed of the RNG driving this simulator.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn source_name(&self) -> String {
        self.source.name()
    }
}
