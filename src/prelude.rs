/*!
Re-export of common values and datatypes used for running and analyzing
simulations. Must be imported manually.

```
use fiftyone_sim::prelude::*;
```
*/

use crate::{
    block, detector, ledger, miner, results, scenario, selection, simulation,
    source, transaction, utxo,
};

pub use block::{Block, BlockHash};

pub use detector::{DetectionReport, SafeModeDetector};

pub use ledger::{AppendError, Ledger};

pub use miner::{Miner, MinerID};

pub use results::{Format, ResultsBuilder, ResultsTable, Summary};

pub use scenario::{AttackPlan, Scenario, ScenarioParseError};

pub use selection::MinerSelection;

pub use simulation::{
    AttackSimulator, SimulationError, SimulatorBuildError, SimulatorBuilder,
    TrialOutput, Trials,
};

pub use source::{
    RandomTransactions, SequentialTransactions, TransactionSource, TxKind,
};

pub use transaction::{OutputRef, Transaction, TxID};

pub use utxo::{Claims, DoubleSpend, UtxoTracker};
