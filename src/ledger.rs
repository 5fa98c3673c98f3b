use std::ops::Index;

use thiserror::Error;
use tracing::info;

use crate::{
    block::{Block, BlockHash},
    utxo::UtxoTracker,
};

/// An append-only chain of [Blocks](Block) along with the [`UtxoTracker`]
/// state derived from their transactions.
///
/// Every ledger extends a base block: the synthetic genesis block for
/// [`Ledger::new`], or the tip of another chain for [`Ledger::forked_from`].
/// The base itself is never part of [`Ledger::blocks`].
#[derive(Debug, Clone)]
pub struct Ledger {
    base: Block,
    blocks: Vec<Block>,
    tracker: UtxoTracker,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppendError {
    #[error(
        "broken chain linkage: block extends {found}, but the tip is {expected}"
    )]
    BrokenLinkage { expected: BlockHash, found: BlockHash },
}

impl Ledger {
    /// Creates an empty ledger extending the genesis block.
    pub fn new() -> Self {
        Self::forked_from(Block::genesis())
    }

    /// Creates an empty ledger whose first block must extend `base`.
    pub fn forked_from(base: Block) -> Self {
        Ledger { base, blocks: vec![], tracker: UtxoTracker::new() }
    }

    /// Appends `block` to the ledger and records the spends of its
    /// transactions.
    ///
    /// The block must extend [`Ledger::tip`]; otherwise the ledger is left
    /// unchanged and [`AppendError::BrokenLinkage`] is returned.
    pub fn append(&mut self, block: Block) -> Result<(), AppendError> {
        let tip = self.tip().hash();
        if block.previous_hash() != tip {
            return Err(AppendError::BrokenLinkage {
                expected: tip.clone(),
                found: block.previous_hash().clone(),
            });
        }

        self.tracker.record_spends(block.transactions());
        info!(
            miner = ?block.miner(),
            hash = block.hash().short(10),
            height = self.blocks.len() + 1,
            "added block to chain"
        );
        self.blocks.push(block);

        Ok(())
    }

    /// Returns the last appended block, or the base block if the ledger is
    /// empty.
    #[inline]
    pub fn tip(&self) -> &Block {
        self.blocks.last().unwrap_or(&self.base)
    }

    /// The block this ledger extends.
    #[inline]
    pub fn base(&self) -> &Block {
        &self.base
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the last `n` blocks, or all blocks if there are fewer than `n`.
    pub fn tail(&self, n: usize) -> &[Block] {
        &self.blocks[self.blocks.len().saturating_sub(n)..]
    }

    #[inline]
    pub fn tracker(&self) -> &UtxoTracker {
        &self.tracker
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Ledger {
    type Output = Block;

    fn index(&self, index: usize) -> &Self::Output {
        self.blocks.index(index)
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl std::fmt::Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", block)?;
        }

        Ok(())
    }
}
