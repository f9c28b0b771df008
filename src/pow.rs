//! Proof-of-work target arithmetic and difficulty retargeting

use crate::constants::{DIFFICULTY_ADJUSTMENT_INTERVAL, TARGET_TIMESPAN};
use crate::error::{ConsensusError, Result};
use crate::types::{ChainState, Digest};
use crate::uint256::U256;

/// Network maximum target: `0x1d00ffff` decoded, i.e. `0xffff * 2^208`.
pub const MAX_TARGET: U256 = U256::from_limbs([0, 0, 0, 0x0000_0000_ffff_0000]);

/// Decode a compact target into its 256-bit value.
///
/// The compact form packs `exponent (1 byte) || mantissa (3 bytes)`; the
/// encoding is signed, and a negative or oversized target can never be a
/// valid difficulty:
/// - sign bit set fails with `NegativeTarget`
/// - a shift past 256 bits fails with `TargetOverflow`
/// - a value above `MAX_TARGET` fails with `TargetAboveMax`
pub fn bits_to_target(bits: u32) -> Result<U256> {
    if bits & 0x0080_0000 != 0 {
        return Err(ConsensusError::NegativeTarget { bits });
    }

    let exponent = bits >> 24;
    let mantissa = bits & 0x007f_ffff;

    let target = if exponent <= 3 {
        U256::from_u64(u64::from(mantissa >> (8 * (3 - exponent))))
    } else if mantissa == 0 {
        U256::ZERO
    } else {
        let shift = 8 * (exponent - 3);
        let mantissa_bits = 31 - mantissa.leading_zeros();
        if mantissa_bits + shift > 255 {
            return Err(ConsensusError::TargetOverflow { bits });
        }
        U256::from_u64(u64::from(mantissa)).shl(shift)
    };

    if target > MAX_TARGET {
        return Err(ConsensusError::TargetAboveMax { bits });
    }

    Ok(target)
}

/// Encode a target in canonical compact form.
///
/// Takes the top three bytes of the value as mantissa; if that sets the sign
/// bit, the mantissa is shifted down a byte and the exponent bumped, so
/// decoding the result always reproduces the value the engine enforces.
pub fn target_to_bits(target: U256) -> u32 {
    let Some(highest_bit) = target.highest_set_bit() else {
        return 0;
    };
    let mut size = highest_bit / 8 + 1;

    let mut compact = if size <= 3 {
        target.get_low_64() << (8 * (3 - size))
    } else {
        target.shr(8 * (size - 3)).get_low_64()
    };

    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }

    (size << 24) | (compact as u32 & 0x007f_ffff)
}

/// Expected work for a target: `floor((2^256 - 1) / (target + 1))`.
pub fn compute_work_from_target(target: U256) -> U256 {
    if target == U256::MAX {
        return U256::ONE;
    }
    // target + 1 cannot overflow past the special case above
    let divisor = target.checked_add(U256::ONE).unwrap_or(U256::MAX);
    U256::MAX.div(divisor)
}

/// Decode `bits` and compute the work its target represents.
pub fn work_from_bits(bits: u32) -> Result<U256> {
    Ok(compute_work_from_target(bits_to_target(bits)?))
}

/// Check that a block hash meets its committed target.
///
/// The hash bytes are interpreted as a little-endian 256-bit integer, which
/// must not exceed the decoded target.
pub fn check_proof_of_work(hash: &Digest, bits: u32) -> Result<()> {
    let target = bits_to_target(bits)?;
    let hash_value = U256::from_le_bytes(&hash.to_bytes());
    if hash_value > target {
        return Err(ConsensusError::InsufficientWork { hash: *hash, bits });
    }
    Ok(())
}

/// Compact target the candidate block at `state.block_height + 1` must
/// commit to.
///
/// Off retarget boundaries this is the epoch target unchanged; at a boundary
/// the new target is derived from how long the closing epoch actually took.
pub fn expected_bits(state: &ChainState, time: u32) -> Result<u32> {
    let height = u64::from(state.block_height) + 1;
    if height % u64::from(DIFFICULTY_ADJUSTMENT_INTERVAL) != 0 {
        return Ok(state.current_target);
    }
    next_work_required(state.current_target, state.epoch_start_time, time)
}

/// Retarget calculation for the first block of a new epoch.
///
/// 1. `actual_timespan = time - epoch_start`, clamped to a factor of four in
///    either direction so one epoch cannot move difficulty further than 4x
/// 2. scale the old target by `actual_timespan / TARGET_TIMESPAN` in
///    extended-width integer arithmetic, truncating
/// 3. clamp to `MAX_TARGET` and re-encode
pub fn next_work_required(current_bits: u32, epoch_start: u32, time: u32) -> Result<u32> {
    // signed intermediate: the timestamp check runs after the target check,
    // so `time` may still be below `epoch_start` here
    let actual_timespan = i64::from(time) - i64::from(epoch_start);
    let clamped_timespan = actual_timespan.clamp(
        i64::from(TARGET_TIMESPAN / 4),
        i64::from(TARGET_TIMESPAN) * 4,
    ) as u64;

    let old_target = bits_to_target(current_bits)?;
    let scaled = old_target
        .checked_mul_u64(clamped_timespan)
        .ok_or(ConsensusError::TargetOverflow { bits: current_bits })?;
    let new_target = scaled.div_u64(u64::from(TARGET_TIMESPAN));

    Ok(target_to_bits(new_target.min(MAX_TARGET)))
}
