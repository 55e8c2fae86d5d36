use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::blockchain::{LedgerSettings, Miner};
use crate::error::{LedgerError, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AUTO_MINER: &str = "auto-miner";

const HOST_KEY: &str = "HOST";
const PORT_KEY: &str = "PORT";
const DIFFICULTY_KEY: &str = "LEDGER_DIFFICULTY";
const REWARD_KEY: &str = "LEDGER_BLOCK_REWARD";
const BATCH_SIZE_KEY: &str = "LEDGER_BATCH_SIZE";
const MINER_THREADS_KEY: &str = "LEDGER_MINER_THREADS";
const AUTO_MINER_KEY: &str = "LEDGER_AUTO_MINER";

/// Process settings. Unset variables fall back to defaults; set but
/// malformed ones are reported instead of being silently replaced.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub ledger: LedgerSettings,
    pub miner_threads: NonZeroUsize,
}

impl Settings {
    /// Read from the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get(HOST_KEY).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse(PORT_KEY, get(PORT_KEY))?.unwrap_or(DEFAULT_PORT);

        let mut ledger = LedgerSettings::default().with_auto_miner(
            get(AUTO_MINER_KEY).unwrap_or_else(|| DEFAULT_AUTO_MINER.to_string()),
        );
        if let Some(difficulty) = parse(DIFFICULTY_KEY, get(DIFFICULTY_KEY))? {
            ledger = ledger
                .with_difficulty(difficulty)
                .map_err(|e| invalid(DIFFICULTY_KEY, e))?;
        }
        if let Some(reward) = parse(REWARD_KEY, get(REWARD_KEY))? {
            ledger = ledger
                .with_block_reward(reward)
                .map_err(|e| invalid(REWARD_KEY, e))?;
        }
        if let Some(batch) = parse(BATCH_SIZE_KEY, get(BATCH_SIZE_KEY))? {
            ledger = ledger
                .with_batch_size(batch)
                .map_err(|e| invalid(BATCH_SIZE_KEY, e))?;
        }

        let miner_threads =
            parse::<NonZeroUsize>(MINER_THREADS_KEY, get(MINER_THREADS_KEY))?
                .unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            host,
            port,
            ledger,
            miner_threads,
        })
    }

    pub fn miner(&self) -> Miner {
        Miner::new(self.miner_threads)
    }
}

fn parse<T>(key: &'static str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.trim()
            .parse::<T>()
            .map_err(|e| LedgerError::InvalidSetting {
                key,
                reason: format!("{v:?}: {e}"),
            })
    })
    .transpose()
}

fn invalid(key: &'static str, err: LedgerError) -> LedgerError {
    LedgerError::InvalidSetting {
        key,
        reason: err.to_string(),
    }
}
