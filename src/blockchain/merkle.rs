//! Merkle commitment over a block's transaction batch.
//!
//! Leaves are SHA-256 digests of each item. Parents hash the concatenation of
//! their children's raw 32-byte digests. A level with an odd node count pairs
//! its last node with itself. A lone node is the root as-is, so a one-item
//! batch has its leaf digest as root. An empty batch commits to
//! [`EMPTY_ROOT`], the SHA-256 of empty input.

use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

pub const EMPTY_ROOT: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

type Node = [u8; 32];

fn leaf(item: &[u8]) -> Node {
    Sha256::digest(item).into()
}

fn parent(left: &Node, right: &Node) -> Node {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Root over an ordered list of byte strings, lowercase hex.
pub fn root<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut level: Vec<Node> = items.into_iter().map(|i| leaf(i.as_ref())).collect();
    if level.is_empty() {
        return EMPTY_ROOT.to_string();
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [l, r] => parent(l, r),
                [only] => parent(only, only),
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
    }

    hex::encode(level[0])
}

/// Root over a transaction batch using each record's canonical JSON as leaf data.
pub fn transactions_root(transactions: &[Transaction]) -> String {
    root(transactions.iter().map(Transaction::canonical_json))
}
