use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    ledger::Ledger,
    miner::{roster, MinerID},
    selection::MinerSelection,
    source::{RandomTransactions, TransactionSource},
};

use super::AttackSimulator;

/// Builds an [`AttackSimulator`].
#[derive(Debug, Clone, Default)]
pub struct SimulatorBuilder {
    pub miners: Option<usize>,
    pub attacker: Option<MinerID>,
    pub selection: MinerSelection,
    pub seed: Option<u64>,
    source: Option<Box<dyn TransactionSource>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SimulatorBuildError {
    #[error("no miners were added to the network")]
    NoMiners,
    #[error("attacker {0} is not one of the network's miners")]
    AttackerNotInRoster(MinerID),
}

impl SimulatorBuilder {
    /// Size of the miner roster when [`SimulatorBuilder::miners`] is not
    /// called.
    pub const DEFAULT_MINERS: usize = 5;
    /// Attacking miner when [`SimulatorBuilder::attacker`] is not called.
    pub const DEFAULT_ATTACKER: usize = 2;

    /// Creates a new [`SimulatorBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The network will contain `n` miners with ids `0..n` (default 5).
    pub fn miners(mut self, n: usize) -> Self {
        self.miners = Some(n);

        self
    }

    /// Sets the miner which carries out attacks (default miner 2).
    pub fn attacker(mut self, id: MinerID) -> Self {
        self.attacker = Some(id);

        self
    }

    /// Sets how honest blocks are assigned to miners
    /// ([`MinerSelection::Random`] used otherwise).
    pub fn selection(mut self, selection: MinerSelection) -> Self {
        self.selection = selection;

        self
    }

    /// Seeds the simulator's RNG. A random seed is chosen at build time
    /// otherwise, and can be read back with [`AttackSimulator::seed`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);

        self
    }

    /// Sets the source of transaction content
    /// ([`RandomTransactions`] used otherwise).
    pub fn source<S: TransactionSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));

        self
    }

    /// Creates an [`AttackSimulator`] from the specified parameters.
    pub fn build(self) -> Result<AttackSimulator, SimulatorBuildError> {
        use SimulatorBuildError::*;

        let SimulatorBuilder { miners, attacker, selection, seed, source } =
            self;

        let miners = roster(miners.unwrap_or(Self::DEFAULT_MINERS));
        if miners.is_empty() {
            return Err(NoMiners);
        }

        let attacker_id =
            attacker.unwrap_or_else(|| Self::DEFAULT_ATTACKER.into());
        let attacker = match miners.iter().find(|m| m.id() == attacker_id) {
            Some(miner) => *miner,
            None => return Err(AttackerNotInRoster(attacker_id)),
        };

        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut source =
            source.unwrap_or_else(|| Box::new(RandomTransactions::new()));
        source.reseed(rng.gen());

        Ok(AttackSimulator {
            public: Ledger::new(),
            private: Ledger::new(),
            miners,
            attacker,
            selection,
            contested: None,
            honest_mined: 0,
            seed,
            rng,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SimulatorBuildError, SimulatorBuilder};

    #[test]
    fn example_build() {
        let sim = SimulatorBuilder::new()
            .seed(3)
            .build()
            .expect("valid simulator build");

        assert_eq!(sim.miners().len(), SimulatorBuilder::DEFAULT_MINERS);
        assert_eq!(sim.attacker().get(), SimulatorBuilder::DEFAULT_ATTACKER);
        assert_eq!(sim.seed(), 3);
        assert_eq!(sim.source_name(), "Random");
        assert!(sim.public().is_empty() && sim.private().is_empty());
    }

    #[test]
    fn rejects_empty_roster() {
        let err = SimulatorBuilder::new().miners(0).build().unwrap_err();
        assert!(matches!(err, SimulatorBuildError::NoMiners));
    }

    #[test]
    fn rejects_unknown_attacker() {
        let err = SimulatorBuilder::new()
            .miners(2)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SimulatorBuildError::AttackerNotInRoster(id) if id.get() == 2
        ));

        assert!(SimulatorBuilder::new()
            .miners(2)
            .attacker(1.into())
            .build()
            .is_ok());
    }
}
