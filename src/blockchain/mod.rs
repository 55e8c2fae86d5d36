pub mod block;
pub mod hash;
pub mod mempool;
pub mod merkle;
pub mod miner;
pub mod model;

use chrono::{SecondsFormat, Utc};

pub use block::Block;
pub use mempool::Mempool;
pub use miner::Miner;
pub use model::{
    Admission, ChainReport, ChainViolation, DrainPolicy, Ledger, LedgerSettings, MineOutcome,
    MinerRewards,
};

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Default credit attributed to the miner of each block.
pub const DEFAULT_BLOCK_REWARD: f64 = 10.0;

/// Difficulty bounds (keep low in dev to avoid long waits)
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 6;

/// Miner identity recorded on block 0.
pub const GENESIS_MINER: &str = "genesis";

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn iso_timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
