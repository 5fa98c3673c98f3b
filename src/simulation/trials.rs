//! Repeating a scenario over many seeds

use std::num::NonZeroUsize;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    detector::{DetectionReport, SafeModeDetector},
    results::ResultsBuilder,
    scenario::Scenario,
};

use super::{SimulationError, SimulatorBuilder};

/// Runs the same [`Scenario`] on independent simulators, one per seed.
///
/// Trial `i` uses seed `base_seed + i`. With the `rayon` feature enabled,
/// trials run in parallel; each trial is itself sequential.
#[derive(Debug, Clone)]
pub struct Trials {
    builder: SimulatorBuilder,
    scenario: Scenario,
    runs: NonZeroUsize,
    base_seed: u64,
    detector: SafeModeDetector,
}

/// The outcome of a single trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialOutput {
    pub seed: u64,
    pub public_len: usize,
    pub private_len: usize,
    pub report: DetectionReport,
}

impl Trials {
    pub fn new(
        builder: SimulatorBuilder,
        scenario: Scenario,
        runs: NonZeroUsize,
        base_seed: u64,
    ) -> Self {
        Trials {
            builder,
            scenario,
            runs,
            base_seed,
            detector: SafeModeDetector::default(),
        }
    }

    /// Replaces the default [`SafeModeDetector`].
    pub fn detector(mut self, detector: SafeModeDetector) -> Self {
        self.detector = detector;

        self
    }

    pub fn run_all(self) -> Result<ResultsBuilder, SimulationError> {
        let Trials { builder, scenario, runs, base_seed, detector } = self;

        let run_one = |i: usize| -> Result<TrialOutput, SimulationError> {
            let seed = base_seed.wrapping_add(i as u64);
            let mut sim = builder.clone().seed(seed).build()?;
            sim.run(scenario)?;

            Ok(TrialOutput {
                seed,
                public_len: sim.public().len(),
                private_len: sim.private().len(),
                report: detector.detect(&sim),
            })
        };

        #[cfg(feature = "rayon")]
        let outputs: Result<Vec<_>, _> =
            (0..runs.get()).into_par_iter().map(run_one).collect();
        #[cfg(not(feature = "rayon"))]
        let outputs: Result<Vec<_>, _> = (0..runs.get()).map(run_one).collect();

        Ok(ResultsBuilder::new(scenario, outputs?))
    }
}
