//! Merkle root over transaction ids with the CVE-2012-2459 mutation guard

use crate::crypto::HashPrimitive;
use crate::error::{ConsensusError, Result};
use crate::types::Digest;

/// Compute the Merkle root over an ordered, non-empty set of 32-byte leaves.
///
/// Each level pairs hashes left to right; an odd count duplicates the last
/// element, and the parent is `double_sha256(left || right)`. A single leaf
/// is its own root.
///
/// Duplicating the trailing element is the one legitimate source of equal
/// siblings. If both halves of an actually-present pair are identical, at
/// any level, the block is a CVE-2012-2459 mutation of another transaction
/// list that shares this root, and the computation fails with
/// `DuplicateSibling` rather than producing a forgeable commitment.
pub fn merkle_root<H: HashPrimitive>(hasher: &H, leaves: &[Digest]) -> Result<Digest> {
    if leaves.is_empty() {
        return Err(ConsensusError::EmptyMerkleInput);
    }

    let mut level: Vec<[u8; 32]> = leaves.iter().map(Digest::to_bytes).collect();
    let mut depth = 0u32;

    while level.len() > 1 {
        let mut parents = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            let left = level[i];
            let right = if i + 1 < level.len() {
                if level[i + 1] == left {
                    return Err(ConsensusError::DuplicateSibling {
                        level: depth,
                        index: i / 2,
                    });
                }
                level[i + 1]
            } else {
                left
            };

            let mut preimage = [0u8; 64];
            preimage[..32].copy_from_slice(&left);
            preimage[32..].copy_from_slice(&right);
            parents.push(hasher.double_sha256(&preimage));

            i += 2;
        }
        level = parents;
        depth += 1;
    }

    Ok(Digest::from_bytes(level[0]))
}
