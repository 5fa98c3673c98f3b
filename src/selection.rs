//! Utilities for choosing which miner produces each honest block.

use rand::{seq::SliceRandom, Rng};

use crate::miner::Miner;

/// Determines which [`Miner`] from the roster mines the next honest block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MinerSelection {
    /// Choose uniformly at random using the simulator's RNG.
    #[default]
    Random,
    /// Cycle through the roster in order, starting with the first miner.
    RoundRobin,
}

impl MinerSelection {
    /// Returns the miner selected to mine block number `round` (counted from
    /// the start of the simulation), or `None` if `roster` is empty.
    pub fn choose<'a, R>(
        &self,
        roster: &'a [Miner],
        round: usize,
        rng: &mut R,
    ) -> Option<&'a Miner>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Random => roster.choose(rng),
            Self::RoundRobin => match roster.len() {
                0 => None,
                n => roster.get(round % n),
            },
        }
    }
}

impl std::str::FromStr for MinerSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "round-robin" => Ok(Self::RoundRobin),
            other => Err(format!("unknown miner selection `{}`", other)),
        }
    }
}
