use std::collections::VecDeque;

use crate::transaction::Transaction;

/// FIFO queue of admitted transactions waiting for a block.
#[derive(Debug, Default)]
pub struct Mempool {
    queue: VecDeque<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Admission never fails.
    pub fn admit(&mut self, tx: Transaction) -> usize {
        self.queue.push_back(tx);
        self.queue.len()
    }

    /// Remove and return up to `limit` transactions from the head, or all of
    /// them when `limit` is `None`.
    pub fn drain(&mut self, limit: Option<usize>) -> Vec<Transaction> {
        let take = limit.map_or(self.queue.len(), |n| n.min(self.queue.len()));
        self.queue.drain(..take).collect()
    }

    /// Copy of the first `limit` transactions (all when `None`), left in place.
    pub fn front(&self, limit: Option<usize>) -> Vec<Transaction> {
        let take = limit.unwrap_or(self.queue.len());
        self.queue.iter().take(take).cloned().collect()
    }

    /// Snapshot of the current contents in FIFO order.
    pub fn peek(&self) -> Vec<Transaction> {
        self.queue.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
