use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::debug;
use parking_lot::Mutex;

use super::Block;
use super::hash::{HashInput, meets_difficulty};

/// Nonce attempts between checks of the stop flags.
pub const CHECK_INTERVAL: u64 = 1024;

/// Proof-of-Work sealer.
///
/// With more than one worker the nonce space is split by stride: worker `k`
/// tries `k, k + n, k + 2n, ...`. The first worker to find a valid nonce wins
/// and the others stop at their next check.
#[derive(Debug, Clone)]
pub struct Miner {
    workers: NonZeroUsize,
}

impl Default for Miner {
    fn default() -> Self {
        Self::single_threaded()
    }
}

impl Miner {
    pub fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    pub fn single_threaded() -> Self {
        Self::new(NonZeroUsize::MIN)
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Find a nonce whose hash has `difficulty` leading zeros and return the
    /// sealed block.
    pub fn seal(&self, candidate: Block, difficulty: u32) -> Block {
        let never = AtomicBool::new(false);
        match self.seal_cancellable(candidate, difficulty, &never) {
            Some(block) => block,
            None => unreachable!("search only stops early when cancelled"),
        }
    }

    /// Like [`Miner::seal`], but gives up and returns `None` once `cancel` is set.
    pub fn seal_cancellable(
        &self,
        mut candidate: Block,
        difficulty: u32,
        cancel: &AtomicBool,
    ) -> Option<Block> {
        let input = HashInput::from_block(&candidate);
        let workers = self.workers.get() as u64;

        let (nonce, hash) = if workers == 1 {
            search(&input, difficulty, 0, 1, &AtomicBool::new(false), cancel)?
        } else {
            let found = AtomicBool::new(false);
            let winner: Mutex<Option<(u64, String)>> = Mutex::new(None);
            thread::scope(|s| {
                for start in 0..workers {
                    let (input, found, winner) = (&input, &found, &winner);
                    s.spawn(move || {
                        if let Some(hit) = search(input, difficulty, start, workers, found, cancel)
                        {
                            if !found.swap(true, Ordering::AcqRel) {
                                *winner.lock() = Some(hit);
                            }
                        }
                    });
                }
            });
            winner.into_inner()?
        };

        debug!(
            "sealed block #{} nonce={} difficulty={}",
            candidate.index, nonce, difficulty
        );
        candidate.nonce = nonce;
        candidate.hash = hash;
        Some(candidate)
    }
}

fn search(
    input: &HashInput,
    difficulty: u32,
    start: u64,
    stride: u64,
    found: &AtomicBool,
    cancel: &AtomicBool,
) -> Option<(u64, String)> {
    let mut nonce = start;
    let mut attempts: u64 = 0;
    loop {
        if attempts % CHECK_INTERVAL == 0
            && (found.load(Ordering::Acquire) || cancel.load(Ordering::Relaxed))
        {
            return None;
        }
        let hash = input.digest(nonce);
        if meets_difficulty(&hash, difficulty) {
            return Some((nonce, hash));
        }
        nonce = nonce.wrapping_add(stride);
        attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn candidate() -> Block {
        Block::candidate(
            1,
            "abc".into(),
            vec![Transaction::new("a", "b", 3.0, "2026-01-01T00:00:00.000Z")],
            "miner-1",
            10.0,
        )
    }

    #[test]
    fn single_worker_finds_smallest_nonce() {
        let block = Miner::single_threaded().seal(candidate(), 2);
        assert!(block.hash.starts_with("00"));
        assert_eq!(block.hash, block.compute_hash());

        let input = HashInput::from_block(&block);
        for n in 0..block.nonce {
            assert!(!meets_difficulty(&input.digest(n), 2));
        }
    }

    #[test]
    fn parallel_workers_produce_valid_seal() {
        let miner = Miner::new(NonZeroUsize::new(4).unwrap());
        let block = miner.seal(candidate(), 3);
        assert!(block.hash.starts_with("000"));
        assert!(block.is_valid(3));
    }

    #[test]
    fn cancelled_search_returns_none() {
        let cancel = AtomicBool::new(true);
        assert!(
            Miner::single_threaded()
                .seal_cancellable(candidate(), 6, &cancel)
                .is_none()
        );
        let parallel = Miner::new(NonZeroUsize::new(3).unwrap());
        assert!(parallel.seal_cancellable(candidate(), 6, &cancel).is_none());
    }

    #[test]
    fn sealing_an_empty_batch_is_legal() {
        let block = Block::candidate(1, "abc".into(), Vec::new(), "m", 0.0);
        let block = Miner::single_threaded().seal(block, 1);
        assert!(block.is_valid(1));
    }
}
