//! Median time-past over the rolling 11-block timestamp window

use crate::constants::MEDIAN_TIME_SPAN;
use crate::error::{ConsensusError, Result};
use crate::types::ChainState;

/// Median of the populated timestamps in the window.
///
/// The window is oldest-first with `min(11, block_height)` populated slots at
/// the end; below eleven blocks of history only that suffix participates. An
/// empty window (the genesis successor) has median zero.
pub fn median_time_past(prev_timestamps: &[u32; MEDIAN_TIME_SPAN], block_height: u32) -> u32 {
    let populated = (block_height as usize).min(MEDIAN_TIME_SPAN);
    if populated == 0 {
        return 0;
    }

    let mut window: Vec<u32> = prev_timestamps[MEDIAN_TIME_SPAN - populated..].to_vec();
    window.sort_unstable();

    if populated % 2 == 0 {
        let upper = populated / 2;
        ((u64::from(window[upper - 1]) + u64::from(window[upper])) / 2) as u32
    } else {
        window[populated / 2]
    }
}

/// A candidate timestamp must be strictly above the median time past.
///
/// There is no upper bound here: the two-hour future limit is node policy,
/// not consensus.
pub fn check_timestamp(state: &ChainState, time: u32) -> Result<()> {
    let median = median_time_past(&state.prev_timestamps, state.block_height);
    if time <= median {
        return Err(ConsensusError::TimestampTooOld { time, median });
    }
    Ok(())
}

/// Shift the window forward, dropping the oldest slot and appending `time`.
pub fn rotate_timestamps(
    window: &[u32; MEDIAN_TIME_SPAN],
    time: u32,
) -> [u32; MEDIAN_TIME_SPAN] {
    let mut next = [0u32; MEDIAN_TIME_SPAN];
    next[..MEDIAN_TIME_SPAN - 1].copy_from_slice(&window[1..]);
    next[MEDIAN_TIME_SPAN - 1] = time;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Digest;
    use crate::uint256::U256;

    fn state_with(window: [u32; MEDIAN_TIME_SPAN], height: u32) -> ChainState {
        ChainState {
            block_height: height,
            total_work: U256::ZERO,
            best_block_hash: Digest::ZERO,
            current_target: 0x1d00ffff,
            epoch_start_time: 0,
            prev_timestamps: window,
        }
    }

    #[test]
    fn test_median_full_window() {
        let window = [100, 200, 300, 400, 500, 600, 700, 800, 900, 1000, 1100];
        assert_eq!(median_time_past(&window, 2000), 600);
    }

    #[test]
    fn test_median_is_order_independent() {
        let window = [1100, 100, 900, 300, 700, 500, 600, 400, 800, 200, 1000];
        assert_eq!(median_time_past(&window, 11), 600);
    }

    #[test]
    fn test_median_short_history_odd() {
        // three blocks applied: only the last three slots participate
        let mut window = [0u32; MEDIAN_TIME_SPAN];
        window[8] = 50;
        window[9] = 90;
        window[10] = 70;
        assert_eq!(median_time_past(&window, 3), 70);
    }

    #[test]
    fn test_median_short_history_even() {
        let mut window = [0u32; MEDIAN_TIME_SPAN];
        window[9] = 100;
        window[10] = 301;
        assert_eq!(median_time_past(&window, 2), 200);
    }

    #[test]
    fn test_median_empty_history() {
        assert_eq!(median_time_past(&[0; MEDIAN_TIME_SPAN], 0), 0);
    }

    #[test]
    fn test_median_large_values_do_not_overflow() {
        let mut window = [0u32; MEDIAN_TIME_SPAN];
        window[9] = u32::MAX;
        window[10] = u32::MAX - 1;
        assert_eq!(median_time_past(&window, 2), u32::MAX - 1);
    }

    #[test]
    fn test_check_timestamp_strictly_greater() {
        let window = [100, 200, 300, 400, 500, 600, 700, 800, 900, 1000, 1100];
        let state = state_with(window, 2000);
        assert!(check_timestamp(&state, 601).is_ok());
        assert_eq!(
            check_timestamp(&state, 600),
            Err(ConsensusError::TimestampTooOld {
                time: 600,
                median: 600
            })
        );
        assert_eq!(
            check_timestamp(&state, 1),
            Err(ConsensusError::TimestampTooOld {
                time: 1,
                median: 600
            })
        );
    }

    #[test]
    fn test_rotate_drops_oldest() {
        let window = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
        assert_eq!(
            rotate_timestamps(&window, 12),
            [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
    }

    #[test]
    fn test_rotate_fills_zero_padding_first() {
        let rotated = rotate_timestamps(&[0; MEDIAN_TIME_SPAN], 500);
        let mut expected = [0u32; MEDIAN_TIME_SPAN];
        expected[10] = 500;
        assert_eq!(rotated, expected);
    }
}
