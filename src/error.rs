//! Error types for consensus validation

use thiserror::Error;

use crate::types::Digest;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("block hash mismatch: declared {declared}, computed {computed}")]
    InvalidBlockHash { declared: Digest, computed: Digest },

    #[error("compact target {bits:#010x} has the sign bit set")]
    NegativeTarget { bits: u32 },

    #[error("compact target {bits:#010x} overflows 256 bits")]
    TargetOverflow { bits: u32 },

    #[error("compact target {bits:#010x} exceeds the network maximum")]
    TargetAboveMax { bits: u32 },

    #[error("wrong target at height {height}: expected {expected:#010x}, got {actual:#010x}")]
    UnexpectedTarget {
        height: u32,
        expected: u32,
        actual: u32,
    },

    #[error("block hash {hash} does not meet target {bits:#010x}")]
    InsufficientWork { hash: Digest, bits: u32 },

    #[error("timestamp {time} is not above the median time past {median}")]
    TimestampTooOld { time: u32, median: u32 },

    #[error("cannot compute a merkle root over an empty leaf set")]
    EmptyMerkleInput,

    #[error("identical sibling hashes at level {level}, pair {index}")]
    DuplicateSibling { level: u32, index: usize },

    #[error("value overflow while summing fees")]
    FeeOverflow,

    #[error("coinbase pays {output} but only {allowed} (subsidy plus fees) is allowed")]
    CoinbaseOverpay { output: u64, allowed: u64 },

    #[error("block has no transactions")]
    CoinbaseMissing,

    #[error("coinbase transaction at index {index}, expected index 0")]
    CoinbaseMisplaced { index: usize },

    #[error("coinbase input is not a single spend of the null outpoint")]
    InvalidCoinbaseInput,

    #[error("utxo validation failed: {0}")]
    UtxoFailure(String),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
