use serde::{Deserialize, Serialize};

use super::hash::{HashInput, meets_difficulty};
use super::{GENESIS_MINER, iso_timestamp_now, merkle};
use crate::transaction::Transaction;

/// A single block in the ledger holding a batch of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: String, // ISO-8601 (UTC)
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // Cached hash of the block
    pub merkle_root: String,
    pub miner: String,
    pub reward: f64,
}

impl Block {
    /// Create the genesis block (first block in the chain). It is not mined.
    pub fn genesis() -> Self {
        let mut block = Self {
            index: 0,
            timestamp: iso_timestamp_now(),
            transactions: Vec::new(),
            previous_hash: String::from("0"),
            nonce: 0,
            hash: String::new(),
            merkle_root: merkle::transactions_root(&[]),
            miner: GENESIS_MINER.to_string(),
            reward: 0.0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create a candidate block (not sealed yet). Hand it to a
    /// [`Miner`](super::Miner) to perform PoW.
    pub fn candidate(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        miner: impl Into<String>,
        reward: f64,
    ) -> Self {
        let merkle_root = merkle::transactions_root(&transactions);
        Self {
            index,
            timestamp: iso_timestamp_now(),
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
            merkle_root,
            miner: miner.into(),
            reward,
        }
    }

    /// Hash of this block's fields (excluding `hash` itself).
    pub fn compute_hash(&self) -> String {
        HashInput::from_block(self).digest(self.nonce)
    }

    /// Merkle root re-derived from the stored transactions.
    pub fn compute_merkle_root(&self) -> String {
        merkle::transactions_root(&self.transactions)
    }

    /// Stored hash and Merkle root both match the block's content, and the
    /// hash satisfies `difficulty`. Does NOT check chain linkage.
    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.hash == self.compute_hash()
            && self.merkle_root == self.compute_merkle_root()
            && meets_difficulty(&self.hash, difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::blockchain::Miner;
    use crate::blockchain::merkle::EMPTY_ROOT;
    use crate::transaction::Transaction;

    fn sample_txs() -> Vec<Transaction> {
        vec![
            Transaction::new("alice", "bob", 10.0, "2026-01-01T00:00:00.000Z"),
            Transaction::new("bob", "carol", 2.5, "2026-01-01T00:00:01.000Z").with_field("memo", "lunch"),
        ]
    }

    #[test]
    fn genesis_has_valid_hash() {
        let b = Block::genesis();
        assert_eq!(b.index, 0);
        assert_eq!(b.previous_hash, "0");
        assert_eq!(b.miner, "genesis");
        assert_eq!(b.reward, 0.0);
        assert_eq!(b.merkle_root, EMPTY_ROOT);
        assert_eq!(b.hash, b.compute_hash());
        assert_eq!(b.hash.len(), 64);
    }

    #[test]
    fn candidate_commits_to_its_transactions() {
        let b = Block::candidate(1, "prev".into(), sample_txs(), "m1", 10.0);
        assert_eq!(b.merkle_root, b.compute_merkle_root());
        assert!(b.hash.is_empty());
        assert_eq!(b.nonce, 0);
    }

    #[test]
    fn mining_produces_leading_zeros() {
        let b = Block::candidate(1, "prev".into(), sample_txs(), "m1", 10.0);
        let b = Miner::single_threaded().seal(b, 2);
        assert!(b.hash.starts_with("00"));
        assert!(b.is_valid(2));
    }

    #[test]
    fn invalid_when_mutated() {
        let b = Block::candidate(2, "prev".into(), sample_txs(), "m1", 10.0);
        let b = Miner::single_threaded().seal(b, 2);

        let mut amount = b.clone();
        amount.transactions[0].amount += 1.0;
        assert!(!amount.is_valid(2));

        let mut extra = b.clone();
        extra
            .transactions
            .push(Transaction::new("x", "y", 1.0, "2026-01-01T00:00:02.000Z"));
        assert!(!extra.is_valid(2));

        let mut reward = b.clone();
        reward.reward = 1000.0;
        assert!(!reward.is_valid(2));

        let mut miner = b;
        miner.miner = "mallory".into();
        assert!(!miner.is_valid(2));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(Block::genesis()).unwrap();
        assert!(json.get("previousHash").is_some());
        assert!(json.get("merkleRoot").is_some());
        assert_eq!(json["transactions"], serde_json::json!([]));
    }
}
