/*!
Miners and their identities

A [`Miner`] carries no state besides its [`MinerID`]: the id is attached to
every block it mines, which is what the safe-mode heuristic inspects.

```
use fiftyone_sim::prelude::*;

let miner = Miner::new(MinerID::from(2));
let block = miner.mine(&Block::genesis(), vec![]);

assert_eq!(block.previous_hash(), Block::genesis().hash());
assert_eq!(block.miner(), Some(MinerID::from(2)));
```
*/

use tracing::info;

use crate::{block::Block, transaction::Transaction};

/// Unique identifier of a [`Miner`]. Corresponds to a [`usize`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MinerID(usize);

impl MinerID {
    /// Returns the [`usize`] corresponding to this [`MinerID`].
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for MinerID {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for MinerID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A participant which produces blocks on whatever parent it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Miner {
    id: MinerID,
}

impl Miner {
    pub fn new(id: MinerID) -> Self {
        Miner { id }
    }

    #[inline]
    pub fn id(&self) -> MinerID {
        self.id
    }

    /// Returns a new block extending `parent` with the given transactions.
    pub fn mine(
        &self,
        parent: &Block,
        transactions: Vec<Transaction>,
    ) -> Block {
        let block =
            Block::new(parent.hash().clone(), transactions, Some(self.id));
        info!(
            miner = %self.id,
            hash = block.hash().short(10),
            "mined a new block"
        );

        block
    }
}

/// Creates the roster `Miner(0)..Miner(n)`.
pub fn roster(n: usize) -> Vec<Miner> {
    (0..n).map(|i| Miner::new(i.into())).collect()
}
