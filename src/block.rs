//! Header hashing and the chain-state transition

use crate::constants::DIFFICULTY_ADJUSTMENT_INTERVAL;
use crate::crypto::HashPrimitive;
use crate::economic::check_coinbase_value;
use crate::error::{ConsensusError, Result};
use crate::merkle::merkle_root;
use crate::pow::{bits_to_target, check_proof_of_work, compute_work_from_target, expected_bits};
use crate::timestamp::{check_timestamp, rotate_timestamps};
use crate::transaction::{check_coinbase_placement, total_fees, txid};
use crate::types::{Block, ChainState, Digest, Header, TransactionData, UtxoCollaborator};

/// Serialized block header size
pub const HEADER_SIZE: usize = 80;

/// Rebuild the 80-byte wire preimage of a header.
///
/// The in-memory header omits `prev_block_hash` and `merkle_root`; they come
/// from the previous chain state and the block body, so the binding to both
/// is re-proven on every hash check.
pub fn serialize_header(
    header: &Header,
    prev_block_hash: &Digest,
    merkle_root: &Digest,
) -> [u8; HEADER_SIZE] {
    let mut bytes = [0u8; HEADER_SIZE];
    bytes[0..4].copy_from_slice(&header.version.to_le_bytes());
    bytes[4..36].copy_from_slice(&prev_block_hash.to_bytes());
    bytes[36..68].copy_from_slice(&merkle_root.to_bytes());
    bytes[68..72].copy_from_slice(&header.time.to_le_bytes());
    bytes[72..76].copy_from_slice(&header.bits.to_le_bytes());
    bytes[76..80].copy_from_slice(&header.nonce.to_le_bytes());
    bytes
}

/// Recompute the block hash from the reconstructed preimage and compare it
/// to the declared hash.
pub fn check_block_hash<H: HashPrimitive>(
    hasher: &H,
    header: &Header,
    prev_block_hash: &Digest,
    merkle_root: &Digest,
) -> Result<()> {
    let preimage = serialize_header(header, prev_block_hash, merkle_root);
    let computed = Digest::from_bytes(hasher.double_sha256(&preimage));
    if computed != header.hash {
        return Err(ConsensusError::InvalidBlockHash {
            declared: header.hash,
            computed,
        });
    }
    Ok(())
}

/// Validate `block` as the successor of `state` and produce the next state.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. declared hash against the rebuilt preimage (Merkle root recomputed
///    from the transaction list in full mode, taken as asserted otherwise)
/// 2. the committed compact target decodes below the network maximum
/// 3. the committed target matches the difficulty schedule for this height
/// 4. the hash meets its target
/// 5. the timestamp is above the median time past
/// 6. full mode only: coinbase placement, per-transaction validation via the
///    UTXO collaborator, and the coinbase value ceiling
///
/// On any error the input state is untouched; on success the returned state
/// has the height, work, best hash, timestamp window and, at a retarget
/// boundary, the target and epoch start advanced.
pub fn apply_block<H, U>(
    hasher: &H,
    utxo: &mut U,
    state: &ChainState,
    block: &Block,
) -> Result<ChainState>
where
    H: HashPrimitive,
    U: UtxoCollaborator,
{
    let header = &block.header;
    let height = state.block_height.saturating_add(1);

    let merkle = match &block.data {
        TransactionData::MerkleRoot(root) => *root,
        TransactionData::Transactions(transactions) => {
            let leaves: Vec<Digest> = transactions.iter().map(|tx| txid(hasher, tx)).collect();
            merkle_root(hasher, &leaves)?
        }
    };
    check_block_hash(hasher, header, &state.best_block_hash, &merkle)?;

    let target = bits_to_target(header.bits)?;

    let expected = expected_bits(state, header.time)?;
    if header.bits != expected {
        return Err(ConsensusError::UnexpectedTarget {
            height,
            expected,
            actual: header.bits,
        });
    }

    check_proof_of_work(&header.hash, header.bits)?;

    check_timestamp(state, header.time)?;

    if let TransactionData::Transactions(transactions) = &block.data {
        check_coinbase_placement(transactions)?;
        let fees = total_fees(utxo, transactions, height)?;
        check_coinbase_value(&transactions[0], height, fees)?;
    }

    let total_work = state
        .total_work
        .checked_add(compute_work_from_target(target))
        .ok_or(ConsensusError::TargetOverflow { bits: header.bits })?;

    let retarget = height % DIFFICULTY_ADJUSTMENT_INTERVAL == 0;
    Ok(ChainState {
        block_height: height,
        total_work,
        best_block_hash: header.hash,
        current_target: if retarget { expected } else { state.current_target },
        // the first block of an epoch records its own time, reproducing the
        // historical off-by-one in the retarget window
        epoch_start_time: if retarget { header.time } else { state.epoch_start_time },
        prev_timestamps: rotate_timestamps(&state.prev_timestamps, header.time),
    })
}
