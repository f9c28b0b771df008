//! # consensus-core
//!
//! Deterministic core of a Bitcoin block-header consensus engine: given a
//! chain state and a candidate block, decide whether the block extends the
//! chain and, if so, produce the next state.
//!
//! The engine is meant to run inside verifiable computation environments, so
//! every function here is pure, bounded and free of hidden I/O. Hashing and
//! transaction/UTXO validation are capabilities supplied by the caller; the
//! only state carried across calls is the fixed-size [`ChainState`] value.
//!
//! ## Design principles
//!
//! 1. **Pure functions**: `(state, block)` in, `(state', error?)` out; a
//!    failed transition leaves the input state untouched
//! 2. **Checked arithmetic**: silent wrap-around is treated as a consensus
//!    bug, never as behavior
//! 3. **Explicit capabilities**: no process-wide singletons; the hash
//!    primitive and the UTXO collaborator travel with the engine value
//!
//! ## Usage
//!
//! ```rust
//! use consensus_core::{Block, ConsensusEngine, Digest, TransactionData};
//!
//! let mut engine = ConsensusEngine::header_only();
//! # let state: consensus_core::ChainState = consensus_core::ChainState {
//! #     block_height: 0,
//! #     total_work: consensus_core::U256::ZERO,
//! #     best_block_hash: Digest::ZERO,
//! #     current_target: 0x1d00ffff,
//! #     epoch_start_time: 0,
//! #     prev_timestamps: [0; 11],
//! # };
//! # let block = Block {
//! #     header: consensus_core::Header {
//! #         hash: Digest::ZERO,
//! #         version: 1,
//! #         time: 1,
//! #         bits: 0x1d00ffff,
//! #         nonce: 0,
//! #     },
//! #     data: TransactionData::MerkleRoot(Digest::ZERO),
//! # };
//! match engine.apply_block(&state, &block) {
//!     Ok(next) => { /* chain advanced */ }
//!     Err(reason) => { /* state unchanged, block rejected */ }
//! }
//! ```

pub mod block;
pub mod constants;
pub mod crypto;
pub mod economic;
pub mod error;
pub mod merkle;
pub mod pow;
pub mod timestamp;
pub mod transaction;
pub mod types;
pub mod uint256;

// Re-export commonly used types
pub use constants::*;
pub use crypto::{HashPrimitive, Sha256d};
pub use error::{ConsensusError, Result};
pub use types::*;
pub use uint256::U256;

/// The consensus engine: validation context bundling the hashing and UTXO
/// capabilities around the chain-state transition.
#[derive(Debug, Clone, Default)]
pub struct ConsensusEngine<H = Sha256d, U = NoUtxo> {
    hasher: H,
    utxo: U,
}

impl ConsensusEngine<Sha256d, NoUtxo> {
    /// Engine for header-only validation with the built-in double-SHA-256.
    ///
    /// Blocks must carry [`TransactionData::MerkleRoot`]; a block with a
    /// transaction list is rejected through the placeholder collaborator.
    pub fn header_only() -> Self {
        ConsensusEngine {
            hasher: Sha256d,
            utxo: NoUtxo,
        }
    }
}

impl<H, U> ConsensusEngine<H, U>
where
    H: HashPrimitive,
    U: UtxoCollaborator,
{
    pub fn new(hasher: H, utxo: U) -> Self {
        ConsensusEngine { hasher, utxo }
    }

    /// Validate `block` as the successor of `state` and return the next
    /// state. On error, `state` is still the engine's best state.
    pub fn apply_block(&mut self, state: &ChainState, block: &Block) -> Result<ChainState> {
        block::apply_block(&self.hasher, &mut self.utxo, state, block)
    }
}
