use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Ledger, MinerRewards};
use crate::transaction::Transaction;

/// Shared application state around a single ledger instance.
pub struct AppState {
    pub ledger: Ledger,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Ledger::default())
    }
}

/* ---------- Generic envelopes ---------- */

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct RecordRequest {
    pub transaction: Transaction,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub pending: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Latest block sealed by this admission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mined_block: Option<Block>,
}

#[derive(Deserialize)]
pub struct SimulateRequest {
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub success: bool,
    pub admitted: usize,
    pub flagged: usize,
    pub pending: usize,
    pub mined_blocks: Vec<u64>,
}

/* ---------- Mining API Models ---------- */

#[derive(Deserialize)]
pub struct MineRequest {
    pub miner: String,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResponse {
    pub valid: bool,
    pub length: usize,
    pub first_invalid_index: Option<usize>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub success: bool,
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct RewardResponse {
    pub success: bool,
    pub reward: f64,
}

#[derive(Deserialize)]
pub struct SetRewardRequest {
    pub reward: f64,
}

/* ---------- Stats API Models ---------- */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub block_reward: f64,
    pub batch_size: Option<usize>,
    pub mempool_size: usize,
    pub sealed_transactions: usize,
    pub last_interval_ms: Option<i64>,
}

pub type RewardsResponse = MinerRewards;
