use std::fmt::Display;

use sha2::{Digest, Sha256};

use crate::{miner::MinerID, transaction::Transaction};

/// Hex-encoded SHA-256 digest identifying a [`Block`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockHash(String);

impl BlockHash {
    /// Previous-hash value of the genesis block.
    pub const NULL: &'static str = "0";

    pub fn null() -> Self {
        BlockHash(Self::NULL.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` characters of the hash, for display.
    pub fn short(&self, n: usize) -> &str {
        match self.0.char_indices().nth(n) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl From<&str> for BlockHash {
    fn from(value: &str) -> Self {
        BlockHash(value.into())
    }
}

impl Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Representation of a mined block of transactions.
///
/// Blocks are immutable: the hash is computed once by [`Block::new`] and any
/// change to the contents requires building a new block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    previous_hash: BlockHash,
    transactions: Vec<Transaction>,
    /// The miner of this block, or `None` for the synthetic genesis block.
    miner: Option<MinerID>,
    hash: BlockHash,
}

impl Block {
    /// Miner tag used for the genesis block in hashes and output.
    pub const GENESIS_MINER: &'static str = "genesis";

    pub fn new(
        previous_hash: BlockHash,
        transactions: Vec<Transaction>,
        miner: Option<MinerID>,
    ) -> Self {
        let hash = Self::compute_hash(&previous_hash, &transactions, miner);

        Block { previous_hash, transactions, miner, hash }
    }

    /// The block every empty ledger starts from.
    pub fn genesis() -> Self {
        Self::new(BlockHash::null(), vec![], None)
    }

    /// Returns the SHA-256 digest of the canonical encoding of the given
    /// block contents.
    ///
    /// Encoding: length-prefixed previous hash, number of transactions, each
    /// transaction (see [`Transaction`]), then a tag byte followed by the
    /// miner id, or the bytes of [`Block::GENESIS_MINER`].
    pub fn compute_hash(
        previous_hash: &BlockHash,
        transactions: &[Transaction],
        miner: Option<MinerID>,
    ) -> BlockHash {
        let prev = previous_hash.as_str().as_bytes();

        let mut bytes =
            Vec::with_capacity(32 + prev.len() + 24 * transactions.len());
        bytes.extend_from_slice(&(prev.len() as u64).to_le_bytes());
        bytes.extend_from_slice(prev);
        bytes.extend_from_slice(&(transactions.len() as u64).to_le_bytes());
        for tx in transactions {
            tx.write_bytes(&mut bytes);
        }
        match miner {
            Some(id) => {
                bytes.push(1);
                bytes.extend_from_slice(&(id.get() as u64).to_le_bytes());
            }
            None => {
                bytes.push(0);
                bytes.extend_from_slice(Self::GENESIS_MINER.as_bytes());
            }
        }

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        BlockHash(hex::encode(hasher.finalize()))
    }

    #[inline]
    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    #[inline]
    pub fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    #[inline]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    #[inline]
    pub fn miner(&self) -> Option<MinerID> {
        self.miner
    }

    pub fn is_genesis(&self) -> bool {
        self.miner.is_none() && self.previous_hash.as_str() == BlockHash::NULL
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.miner {
            Some(id) => write!(f, "Block(miner: {}", id)?,
            None => write!(f, "Block(miner: {}", Self::GENESIS_MINER)?,
        }
        write!(
            f,
            ", hash: {}, prev_hash: {})",
            self.hash.short(10),
            self.previous_hash.short(10)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{OutputRef, Transaction};

    fn sample_txs() -> Vec<Transaction> {
        vec![
            Transaction::spending(1000.into(), 100.into()),
            Transaction::new(
                1001.into(),
                [OutputRef::from(101), OutputRef::from(102)],
            ),
        ]
    }

    #[test]
    fn hash_is_deterministic() {
        let a = Block::new("abc".into(), sample_txs(), Some(1.into()));
        let b = Block::new("abc".into(), sample_txs(), Some(1.into()));

        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash().as_str().len(), 64);
        assert_eq!(
            a.hash(),
            &Block::compute_hash(
                a.previous_hash(),
                a.transactions(),
                a.miner()
            )
        );
    }

    #[test]
    fn hash_changes_with_each_field() {
        let base = Block::new("abc".into(), sample_txs(), Some(1.into()));

        let other_prev =
            Block::new("abd".into(), sample_txs(), Some(1.into()));
        assert_ne!(base.hash(), other_prev.hash());

        let mut txs = sample_txs();
        txs[1].inputs[1] = 103.into();
        let other_txs = Block::new("abc".into(), txs, Some(1.into()));
        assert_ne!(base.hash(), other_txs.hash());

        let other_miner =
            Block::new("abc".into(), sample_txs(), Some(2.into()));
        assert_ne!(base.hash(), other_miner.hash());

        let genesis_miner = Block::new("abc".into(), sample_txs(), None);
        assert_ne!(base.hash(), genesis_miner.hash());
    }

    #[test]
    fn transaction_boundaries_affect_hash() {
        // Same flattened ids, different grouping into transactions.
        let one = vec![Transaction::new(
            1.into(),
            [OutputRef::from(2), OutputRef::from(3)],
        )];
        let two = vec![
            Transaction::new(1.into(), [OutputRef::from(2)]),
            Transaction::new(3.into(), Vec::<OutputRef>::new()),
        ];

        assert_ne!(
            Block::compute_hash(&BlockHash::null(), &one, None),
            Block::compute_hash(&BlockHash::null(), &two, None)
        );
    }

    #[test]
    fn genesis_block() {
        let genesis = Block::genesis();

        assert!(genesis.is_genesis());
        assert_eq!(genesis.previous_hash().as_str(), "0");
        assert!(genesis.transactions().is_empty());
        assert_eq!(genesis.hash(), Block::genesis().hash());
    }

    #[test]
    fn display_truncates_hashes() {
        let genesis = Block::genesis();
        let text = genesis.to_string();

        assert!(text.starts_with("Block(miner: genesis, hash: "));
        assert!(text.ends_with("prev_hash: 0)"));
        assert!(text.contains(genesis.hash().short(10)));
    }
}
