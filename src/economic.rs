//! Subsidy schedule and the coinbase value ceiling

use crate::constants::{HALVING_INTERVAL, INITIAL_SUBSIDY, MAX_HALVINGS};
use crate::error::{ConsensusError, Result};
use crate::types::Transaction;

/// Block subsidy at a height.
///
/// Halves every 210,000 blocks and is zero from the 64th halving on.
pub fn block_subsidy(height: u32) -> u64 {
    let halvings = height / HALVING_INTERVAL;
    if halvings >= MAX_HALVINGS {
        return 0;
    }
    INITIAL_SUBSIDY >> halvings
}

/// The coinbase may claim at most the subsidy plus the block's fees.
/// Claiming less burns the difference, which is legal.
pub fn check_coinbase_value(coinbase: &Transaction, height: u32, fees: u64) -> Result<()> {
    let mut output = 0u64;
    for txo in &coinbase.outputs {
        output = output
            .checked_add(txo.value)
            .ok_or(ConsensusError::FeeOverflow)?;
    }

    let allowed = block_subsidy(height)
        .checked_add(fees)
        .ok_or(ConsensusError::FeeOverflow)?;

    if output > allowed {
        return Err(ConsensusError::CoinbaseOverpay { output, allowed });
    }
    Ok(())
}
