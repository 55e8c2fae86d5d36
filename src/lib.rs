//! In-memory Proof-of-Work ledger: blocks linked by SHA-256, a Merkle
//! commitment per block, a FIFO mempool and whole-chain verification,
//! served over a small REST API.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod transaction;

pub use blockchain::{Block, Ledger, LedgerSettings, MineOutcome};
pub use error::{LedgerError, Result};
pub use transaction::Transaction;
