//! Transactions and the output references they spend

use std::fmt::Display;

/// Unique identifier assigned to each [`Transaction`] when it is created.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxID(u64);

impl TxID {
    /// Returns the [`u64`] corresponding to this [`TxID`].
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TxID {
    fn from(value: u64) -> Self {
        TxID(value)
    }
}

impl Display for TxID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Identifier of a spendable output. Outputs are not modeled beyond the
/// reference a transaction uses to claim them.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputRef(u64);

impl OutputRef {
    /// Returns the [`u64`] corresponding to this [`OutputRef`].
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OutputRef {
    fn from(value: u64) -> Self {
        OutputRef(value)
    }
}

impl Display for OutputRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A transaction which claims (spends) each of its input references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub id: TxID,
    pub inputs: Vec<OutputRef>,
}

impl Transaction {
    pub fn new<I>(id: TxID, inputs: I) -> Self
    where
        I: IntoIterator<Item = OutputRef>,
    {
        Transaction { id, inputs: inputs.into_iter().collect() }
    }

    /// A transaction with the single input `output`.
    pub fn spending(id: TxID, output: OutputRef) -> Self {
        Transaction { id, inputs: vec![output] }
    }

    /// Appends the canonical byte encoding of this transaction to `buf`.
    ///
    /// Layout: id, number of inputs, then each input, all as little-endian
    /// `u64`s.
    pub(crate) fn write_bytes(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.id.0.to_le_bytes());
        buf.extend_from_slice(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(&input.0.to_le_bytes());
        }
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inputs: Vec<_> =
            self.inputs.iter().map(|i| i.to_string()).collect();
        write!(f, "{{id: {}, inputs: [{}]}}", self.id, inputs.join(", "))
    }
}
