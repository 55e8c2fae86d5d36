use sha2::{Digest, Sha256};

use super::Block;
use crate::transaction::model::canonical_batch_json;

/// SHA-256 of `data`, lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// True when `hash` starts with at least `difficulty` `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|c| c == b'0')
}

/// Block preimage split around the nonce.
///
/// The preimage is `index:previous_hash:timestamp:txs:nonce:merkle_root:miner:reward`.
/// Everything except the nonce is rendered once, so the proof-of-work loop
/// only formats an integer per attempt.
#[derive(Debug, Clone)]
pub struct HashInput {
    prefix: String,
    suffix: String,
}

impl HashInput {
    pub fn from_block(block: &Block) -> Self {
        let prefix = format!(
            "{}:{}:{}:{}:",
            block.index,
            block.previous_hash,
            block.timestamp,
            canonical_batch_json(&block.transactions)
        );
        let suffix = format!(
            ":{}:{}:{}",
            block.merkle_root, block.miner, block.reward
        );
        Self { prefix, suffix }
    }

    pub fn digest(&self, nonce: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.prefix.as_bytes());
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(self.suffix.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn difficulty_predicate() {
        assert!(meets_difficulty("000abc", 3));
        assert!(meets_difficulty("000abc", 0));
        assert!(!meets_difficulty("00a0bc", 3));
        assert!(!meets_difficulty("00", 3));
    }

    #[test]
    fn digest_matches_plain_preimage() {
        let block = Block::genesis();
        let input = HashInput::from_block(&block);
        let preimage = format!(
            "0:0:{}:[]:42:{}:genesis:0",
            block.timestamp, block.merkle_root
        );
        assert_eq!(input.digest(42), sha256_hex(preimage.as_bytes()));
    }

    #[test]
    fn digest_depends_on_nonce() {
        let input = HashInput::from_block(&Block::genesis());
        assert_eq!(input.digest(1), input.digest(1));
        assert_ne!(input.digest(1), input.digest(2));
    }
}
