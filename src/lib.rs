/*!
Simulator for majority-hashpower ("51%") attacks and double-spend detection.

A network of miners extends a public chain while, under attack, one miner
secretly extends a private chain of its own. Every chain tracks which
transaction claimed each output, which lets a [`SafeModeDetector`] compare the
two chains for double spends after the fact.

```
use fiftyone_sim::prelude::*;

let mut sim = AttackSimulator::builder()
    .seed(7)
    .source(SequentialTransactions::new())
    .build()
    .unwrap();
sim.run(Scenario::AttackDoubleSpend).unwrap();

let report = SafeModeDetector::default().detect(&sim);
assert!(!report.is_safe());
```

[`SafeModeDetector`]: detector::SafeModeDetector
*/

pub mod block;
pub mod detector;
pub mod ledger;
pub mod miner;
pub mod prelude;
pub mod results;
pub mod scenario;
pub mod selection;
pub mod simulation;
pub mod source;
pub mod transaction;
pub mod utxo;
