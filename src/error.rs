use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Input-validation failures surfaced by the ledger and its configuration layer.
///
/// Mining outcomes and chain integrity are not errors; see
/// [`crate::blockchain::MineOutcome`] and [`crate::blockchain::ChainReport`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("difficulty must be between {min} and {max}, got {value}")]
    InvalidDifficulty { value: u32, min: u32, max: u32 },

    #[error("block reward must be a non-negative number, got {0}")]
    InvalidReward(f64),

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("invalid transaction: {0}")]
    InvalidTransaction(&'static str),

    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}
