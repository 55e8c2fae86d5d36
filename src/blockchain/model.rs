use std::sync::atomic::AtomicBool;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;

use super::hash::meets_difficulty;
use super::{
    Block, DEFAULT_BLOCK_REWARD, DEFAULT_DIFFICULTY, DIFF_MAX, DIFF_MIN, Mempool, Miner,
};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// How much of the mempool a single mine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Every pending transaction goes into the next block. Mining is manual.
    All,
    /// At most `n` per block; admitting the `n`-th pending transaction mines
    /// a block automatically.
    Batch(usize),
}

impl DrainPolicy {
    fn limit(self) -> Option<usize> {
        match self {
            DrainPolicy::All => None,
            DrainPolicy::Batch(n) => Some(n),
        }
    }
}

/// Tunables read by every mine. Changes never touch existing blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    difficulty: u32,
    block_reward: f64,
    policy: DrainPolicy,
    auto_miner: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            block_reward: DEFAULT_BLOCK_REWARD,
            policy: DrainPolicy::All,
            auto_miner: "auto-miner".to_string(),
        }
    }
}

impl LedgerSettings {
    pub fn with_difficulty(mut self, difficulty: u32) -> Result<Self> {
        self.difficulty = check_difficulty(difficulty)?;
        Ok(self)
    }

    pub fn with_block_reward(mut self, reward: f64) -> Result<Self> {
        self.block_reward = check_reward(reward)?;
        Ok(self)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(LedgerError::InvalidBatchSize);
        }
        self.policy = DrainPolicy::Batch(batch_size);
        Ok(self)
    }

    pub fn with_auto_miner(mut self, miner: impl Into<String>) -> Self {
        self.auto_miner = miner.into();
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn block_reward(&self) -> f64 {
        self.block_reward
    }

    pub fn policy(&self) -> DrainPolicy {
        self.policy
    }

    pub fn auto_miner(&self) -> &str {
        &self.auto_miner
    }
}

fn check_difficulty(difficulty: u32) -> Result<u32> {
    if !(DIFF_MIN..=DIFF_MAX).contains(&difficulty) {
        return Err(LedgerError::InvalidDifficulty {
            value: difficulty,
            min: DIFF_MIN,
            max: DIFF_MAX,
        });
    }
    Ok(difficulty)
}

fn check_reward(reward: f64) -> Result<f64> {
    if !reward.is_finite() || reward < 0.0 {
        return Err(LedgerError::InvalidReward(reward));
    }
    Ok(reward)
}

/// Result of a mine request.
#[derive(Debug, Clone, PartialEq)]
pub enum MineOutcome {
    Sealed(Block),
    /// The mempool was empty; nothing changed.
    NothingToMine,
    /// The search was stopped; the batch never left the mempool.
    Cancelled,
}

/// Result of admitting a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    /// Mempool size right after this admission, before any auto-mine.
    pub pending: usize,
    /// Blocks sealed as a side effect, one per full batch, in chain order.
    pub mined: Vec<Block>,
}

/// First integrity failure found by [`Ledger::validate_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("genesis block is malformed")]
    MalformedGenesis,
    #[error("block {index} is out of sequence")]
    OutOfSequence { index: u64 },
    #[error("block {index} does not link to its predecessor")]
    BrokenLink { index: u64 },
    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: u64 },
    #[error("block {index} merkle root does not match its transactions")]
    MerkleMismatch { index: u64 },
    #[error("block {index} does not satisfy the minimum difficulty")]
    InsufficientWork { index: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    pub length: usize,
    /// Position of the first offending block, if any.
    pub first_invalid: Option<usize>,
    pub violation: Option<ChainViolation>,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.violation.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinerRewards {
    pub miner: String,
    pub blocks: usize,
    pub total_reward: f64,
}

/// Append-only in-memory ledger with Proof-of-Work.
///
/// Admission only touches the mempool lock, so transactions arriving while a
/// block is being sealed queue up for the next block. Mines are serialized by
/// a dedicated lock. A batch stays in the mempool while its block is sealed and
/// moves to the chain in one step, under the chain write lock.
///
/// Lock order is chain, then mempool.
#[derive(Debug)]
pub struct Ledger {
    chain: RwLock<Vec<Block>>,
    mempool: Mutex<Mempool>,
    settings: RwLock<LedgerSettings>,
    mining: Mutex<()>,
    miner: Miner,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerSettings::default(), Miner::default())
    }
}

impl Ledger {
    /// Initialize a new ledger seeded with a genesis block.
    pub fn new(settings: LedgerSettings, miner: Miner) -> Self {
        info!(
            "ledger initialised: difficulty={} reward={} policy={:?} workers={}",
            settings.difficulty,
            settings.block_reward,
            settings.policy,
            miner.workers()
        );
        Self {
            chain: RwLock::new(vec![Block::genesis()]),
            mempool: Mutex::new(Mempool::new()),
            settings: RwLock::new(settings),
            mining: Mutex::new(()),
            miner,
        }
    }

    /// Queue a transaction. Under a batch policy this may seal a block.
    pub fn admit_transaction(&self, tx: Transaction) -> Admission {
        let pending = self.mempool.lock().admit(tx);
        debug!("mempool size now {pending}");

        let (policy, auto_miner) = {
            let settings = self.settings.read();
            (settings.policy, settings.auto_miner.clone())
        };
        let mut mined = Vec::new();
        if let DrainPolicy::Batch(n) = policy {
            // Admissions may pile up behind a running mine; seal every full batch.
            while self.mempool_len() >= n {
                match self.mine_block(&auto_miner) {
                    MineOutcome::Sealed(block) => mined.push(block),
                    _ => break,
                }
            }
        }

        Admission { pending, mined }
    }

    /// Seal a block over the head of the mempool (per policy) and append it.
    pub fn mine_block(&self, miner: &str) -> MineOutcome {
        self.mine_with(miner, None)
    }

    /// [`Ledger::mine_block`] that stops when `cancel` is set.
    pub fn mine_block_cancellable(&self, miner: &str, cancel: &AtomicBool) -> MineOutcome {
        self.mine_with(miner, Some(cancel))
    }

    fn mine_with(&self, miner: &str, cancel: Option<&AtomicBool>) -> MineOutcome {
        let _guard = self.mining.lock();

        let (difficulty, reward, limit) = {
            let settings = self.settings.read();
            (settings.difficulty, settings.block_reward, settings.policy.limit())
        };

        // Only mines remove from the mempool and they are serialized, so this
        // prefix is still at the head once the seal completes.
        let batch = self.mempool.lock().front(limit);
        if batch.is_empty() {
            debug!("mine requested by {miner} with empty mempool");
            return MineOutcome::NothingToMine;
        }
        let batch_len = batch.len();

        let tip = self.latest_block();
        let candidate = Block::candidate(tip.index + 1, tip.hash, batch, miner, reward);

        let sealed = match cancel {
            None => self.miner.seal(candidate, difficulty),
            Some(flag) => match self.miner.seal_cancellable(candidate, difficulty, flag) {
                Some(block) => block,
                None => {
                    warn!("mining cancelled; {batch_len} txs stay pending");
                    return MineOutcome::Cancelled;
                }
            },
        };

        {
            let mut chain = self.chain.write();
            let drained = self.mempool.lock().drain(Some(batch_len));
            debug_assert_eq!(drained, sealed.transactions);
            chain.push(sealed.clone());
        }
        info!(
            "sealed block #{} ({} txs, miner={}, reward={}, hash={})",
            sealed.index, batch_len, sealed.miner, sealed.reward, sealed.hash
        );
        MineOutcome::Sealed(sealed)
    }

    /// Re-derive every block's hash and Merkle root and check linkage.
    pub fn validate_chain(&self) -> ChainReport {
        let chain = self.chain.read();
        let violation = find_violation(&chain);
        if let Some((pos, v)) = &violation {
            warn!("chain integrity violation at position {pos}: {v}");
        }
        ChainReport {
            length: chain.len(),
            first_invalid: violation.as_ref().map(|(pos, _)| *pos),
            violation: violation.map(|(_, v)| v),
        }
    }

    pub fn set_difficulty(&self, difficulty: u32) -> Result<u32> {
        let difficulty = check_difficulty(difficulty).inspect_err(|e| warn!("{e}"))?;
        self.settings.write().difficulty = difficulty;
        info!("difficulty set to {difficulty}");
        Ok(difficulty)
    }

    pub fn set_block_reward(&self, reward: f64) -> Result<f64> {
        let reward = check_reward(reward).inspect_err(|e| warn!("{e}"))?;
        self.settings.write().block_reward = reward;
        info!("block reward set to {reward}");
        Ok(reward)
    }

    pub fn get_chain(&self) -> Vec<Block> {
        self.chain.read().clone()
    }

    pub fn get_mempool(&self) -> Vec<Transaction> {
        self.mempool.lock().peek()
    }

    /// Chain and mempool read together, never between the two halves of a mine.
    pub fn snapshot(&self) -> (Vec<Block>, Vec<Transaction>) {
        let chain = self.chain.read();
        let pending = self.mempool.lock().peek();
        (chain.clone(), pending)
    }

    /// Return the last block in the chain.
    pub fn latest_block(&self) -> Block {
        let chain = self.chain.read();
        // Seeded with genesis and append-only, so never empty.
        chain[chain.len() - 1].clone()
    }

    /// Number of blocks, genesis included.
    pub fn height(&self) -> usize {
        self.chain.read().len()
    }

    pub fn mempool_len(&self) -> usize {
        self.mempool.lock().len()
    }

    pub fn settings(&self) -> LedgerSettings {
        self.settings.read().clone()
    }

    pub fn difficulty(&self) -> u32 {
        self.settings.read().difficulty
    }

    pub fn block_reward(&self) -> f64 {
        self.settings.read().block_reward
    }

    /// Blocks sealed by `miner` and the rewards credited for them.
    pub fn rewards_of(&self, miner: &str) -> MinerRewards {
        let chain = self.chain.read();
        let (blocks, total_reward) = chain
            .iter()
            .skip(1)
            .filter(|b| b.miner == miner)
            .fold((0, 0.0), |(n, sum), b| (n + 1, sum + b.reward));
        MinerRewards {
            miner: miner.to_string(),
            blocks,
            total_reward,
        }
    }
}

fn find_violation(chain: &[Block]) -> Option<(usize, ChainViolation)> {
    let Some(genesis) = chain.first() else {
        return Some((0, ChainViolation::MalformedGenesis));
    };
    if genesis.index != 0
        || genesis.previous_hash != "0"
        || genesis.hash != genesis.compute_hash()
        || genesis.merkle_root != genesis.compute_merkle_root()
    {
        return Some((0, ChainViolation::MalformedGenesis));
    }

    for (pos, pair) in chain.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let pos = pos + 1;
        let index = current.index;

        let violation = if index != prev.index + 1 {
            Some(ChainViolation::OutOfSequence { index })
        } else if current.previous_hash != prev.hash {
            Some(ChainViolation::BrokenLink { index })
        } else if current.hash != current.compute_hash() {
            Some(ChainViolation::HashMismatch { index })
        } else if current.merkle_root != current.compute_merkle_root() {
            Some(ChainViolation::MerkleMismatch { index })
        } else if !meets_difficulty(&current.hash, DIFF_MIN) {
            Some(ChainViolation::InsufficientWork { index })
        } else {
            None
        };

        if let Some(v) = violation {
            return Some((pos, v));
        }
    }
    None
}
