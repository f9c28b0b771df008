//! Core data types for header-chain consensus validation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{COINBASE_OUTPOINT_INDEX, MEDIAN_TIME_SPAN};
use crate::uint256::U256;

/// 256-bit digest held as eight big-endian u32 words.
///
/// The words cover the digest in internal (SHA-256 output) byte order, the
/// granularity hashing circuits consume. Bitcoin tooling displays digests
/// byte-reversed, which is what [`Digest::from_hex`] parses and `Display`
/// prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest(pub [u32; 8]);

impl Digest {
    pub const ZERO: Digest = Digest([0; 8]);

    /// Wrap 32 bytes in internal (SHA output) order.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let mut words = [0u32; 8];
        for (i, word) in words.iter_mut().enumerate() {
            let mut chunk = [0u8; 4];
            chunk.copy_from_slice(&bytes[i * 4..(i + 1) * 4]);
            *word = u32::from_be_bytes(chunk);
        }
        Digest(words)
    }

    /// The 32 bytes in internal (SHA output) order.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, &word) in self.0.iter().enumerate() {
            bytes[i * 4..(i + 1) * 4].copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Parse the byte-reversed display encoding used by Bitcoin tooling.
    pub fn from_hex(display: &str) -> Option<Self> {
        let decoded = hex::decode(display).ok()?;
        let mut bytes: [u8; 32] = decoded.try_into().ok()?;
        bytes.reverse();
        Some(Digest::from_bytes(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.to_bytes();
        bytes.reverse();
        for byte in bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Authenticated block header fields carried across transitions.
///
/// `prev_block_hash` and `merkle_root` are deliberately absent: the previous
/// chain state and the block body supply them when the declared hash is
/// re-proven, so they are never stored twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub hash: Digest,
    pub version: u32,
    /// Unix seconds, as claimed by the miner
    pub time: u32,
    /// Compact target the block commits to
    pub bits: u32,
    pub nonce: u32,
}

/// Transaction payload of a candidate block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    /// Header-only validation: the caller asserts the Merkle root and opts
    /// out of transaction and coinbase checks.
    MerkleRoot(Digest),
    /// Full validation: the root is recomputed from the list and transaction
    /// semantics are enforced.
    Transactions(Vec<Transaction>),
}

/// A candidate block: header plus its transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub data: TransactionData,
}

/// Reference to a transaction output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Digest,
    pub index: u32,
}

impl OutPoint {
    /// The null outpoint spent by coinbase inputs.
    pub const fn null() -> Self {
        OutPoint {
            hash: Digest::ZERO,
            index: COINBASE_OUTPOINT_INDEX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash == Digest::ZERO && self.index == COINBASE_OUTPOINT_INDEX
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Value in satoshis
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// The fixpoint of the chain transition: everything consensus needs to
/// validate the next block.
///
/// `prev_timestamps` holds the most recent `min(11, block_height)` block
/// timestamps oldest-first; slots before actual history are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    /// Number of applied blocks, equal to the height of the best block
    pub block_height: u32,
    /// Sum of per-header work over the applied chain
    pub total_work: U256,
    pub best_block_hash: Digest,
    /// Compact target every block of the current epoch must commit to
    pub current_target: u32,
    /// Timestamp of the first block of the current 2016-block epoch
    pub epoch_start_time: u32,
    pub prev_timestamps: [u32; MEDIAN_TIME_SPAN],
}

impl ChainState {
    /// Fixed wire size of the serialized state.
    pub const SERIALIZED_SIZE: usize = 120;

    /// Canonical 120-byte layout: height, total work (LE), best hash
    /// (internal order), compact target, epoch start, timestamp window.
    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut bytes = [0u8; Self::SERIALIZED_SIZE];
        bytes[0..4].copy_from_slice(&self.block_height.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.total_work.to_le_bytes());
        bytes[36..68].copy_from_slice(&self.best_block_hash.to_bytes());
        bytes[68..72].copy_from_slice(&self.current_target.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.epoch_start_time.to_le_bytes());
        for (i, &time) in self.prev_timestamps.iter().enumerate() {
            bytes[76 + i * 4..80 + i * 4].copy_from_slice(&time.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; Self::SERIALIZED_SIZE]) -> Self {
        let le_u32 = |offset: usize| {
            let mut chunk = [0u8; 4];
            chunk.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_le_bytes(chunk)
        };

        let mut work = [0u8; 32];
        work.copy_from_slice(&bytes[4..36]);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[36..68]);

        let mut prev_timestamps = [0u32; MEDIAN_TIME_SPAN];
        for (i, slot) in prev_timestamps.iter_mut().enumerate() {
            *slot = le_u32(76 + i * 4);
        }

        ChainState {
            block_height: le_u32(0),
            total_work: U256::from_le_bytes(&work),
            best_block_hash: Digest::from_bytes(hash),
            current_target: le_u32(68),
            epoch_start_time: le_u32(72),
            prev_timestamps,
        }
    }
}

/// External transaction validation capability, consulted in full mode.
///
/// Implementations own UTXO lookup and script semantics; the engine only
/// requires deterministic fee reporting and error propagation.
pub trait UtxoCollaborator {
    /// Validate and apply one non-coinbase transaction, returning its fee in
    /// satoshis.
    fn apply_transaction(&mut self, tx: &Transaction, height: u32) -> Result<u64, String>;
}

/// Collaborator for header-only deployments; rejects any full-mode call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUtxo;

impl UtxoCollaborator for NoUtxo {
    fn apply_transaction(&mut self, _tx: &Transaction, _height: u32) -> Result<u64, String> {
        Err("transaction validation is not available in header-only mode".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_byte_round_trip() {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let digest = Digest::from_bytes(bytes);
        assert_eq!(digest.to_bytes(), bytes);
        assert_eq!(digest.0[0], 0x00010203);
    }

    #[test]
    fn test_digest_display_is_byte_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xaa;
        bytes[31] = 0x01;
        let digest = Digest::from_bytes(bytes);
        let display = digest.to_string();
        assert!(display.starts_with("01"));
        assert!(display.ends_with("aa"));
    }

    #[test]
    fn test_digest_from_hex_round_trip() {
        let display = "000000002a22cfee1f2c846adbd12b3e183d4f97683f85dad08a79780a84bd55";
        let digest = Digest::from_hex(display).unwrap();
        assert_eq!(digest.to_string(), display);
        // internal order is the reverse of the display string
        assert_eq!(digest.to_bytes()[0], 0x55);
    }

    #[test]
    fn test_digest_from_hex_rejects_bad_input() {
        assert!(Digest::from_hex("abcd").is_none());
        assert!(Digest::from_hex("zz").is_none());
    }

    #[test]
    fn test_null_outpoint() {
        assert!(OutPoint::null().is_null());
        let real = OutPoint {
            hash: Digest::from_bytes([1; 32]),
            index: 0,
        };
        assert!(!real.is_null());
    }

    #[test]
    fn test_chain_state_round_trip() {
        let state = ChainState {
            block_height: 170,
            total_work: U256::from_u64(0x0100010001).checked_mul_u64(171).unwrap(),
            best_block_hash: Digest::from_bytes([7; 32]),
            current_target: 0x1d00ffff,
            epoch_start_time: 1231006505,
            prev_timestamps: [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        };
        let bytes = state.to_bytes();
        assert_eq!(bytes.len(), ChainState::SERIALIZED_SIZE);
        assert_eq!(ChainState::from_bytes(&bytes), state);
    }

    #[test]
    fn test_chain_state_layout_offsets() {
        let state = ChainState {
            block_height: 0x04030201,
            total_work: U256::ZERO,
            best_block_hash: Digest::ZERO,
            current_target: 0x1d00ffff,
            epoch_start_time: 0,
            prev_timestamps: [0; MEDIAN_TIME_SPAN],
        };
        let bytes = state.to_bytes();
        assert_eq!(&bytes[0..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[68..72], &[0xff, 0xff, 0x00, 0x1d]);
    }
}
