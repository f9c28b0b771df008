//! Bitcoin consensus constants

/// Satoshis per BTC
pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Initial block subsidy: 50 BTC
pub const INITIAL_SUBSIDY: u64 = 50 * SATOSHIS_PER_BTC;

/// Halving interval: 210,000 blocks
pub const HALVING_INTERVAL: u32 = 210_000;

/// After this many halvings the subsidy is zero
pub const MAX_HALVINGS: u32 = 64;

/// Difficulty adjustment interval: 2016 blocks
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: u32 = 2016;

/// Target time per block: 10 minutes
pub const TARGET_TIME_PER_BLOCK: u32 = 600;

/// Target timespan of one difficulty epoch: two weeks
pub const TARGET_TIMESPAN: u32 = DIFFICULTY_ADJUSTMENT_INTERVAL * TARGET_TIME_PER_BLOCK;

/// Maximum target (minimum difficulty) in compact form
pub const MAX_TARGET_BITS: u32 = 0x1d00ffff;

/// Number of prior block timestamps in the median-time-past window
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Output index of the null outpoint spent by a coinbase input
pub const COINBASE_OUTPOINT_INDEX: u32 = 0xffffffff;
