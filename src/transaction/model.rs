use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LedgerError, Result};

/// A transfer record as admitted into the mempool.
///
/// The ledger does not interpret anything beyond the core fields; every
/// additional field the submitter sent is carried in `extra` and takes part
/// in hashing exactly like the core fields do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: f64,
    /// ISO-8601 (UTC). Stamped by the transport on submission.
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: f64,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp: timestamp.into(),
            extra: Map::new(),
        }
    }

    /// Attach an extension field. Core field names are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !matches!(key.as_str(), "from" | "to" | "amount" | "timestamp") {
            self.extra.insert(key, value.into());
        }
        self
    }

    /// Structural checks applied by the transport before admission.
    /// The ledger itself never rejects a transaction.
    pub fn check_format(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction("`from` is required"));
        }
        if self.to.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction("`to` is required"));
        }
        if !self.amount.is_finite() {
            return Err(LedgerError::InvalidTransaction("`amount` must be a number"));
        }
        Ok(())
    }

    /// JSON object with every field of the record, keys in canonical order.
    pub fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map.insert("from".into(), Value::String(self.from.clone()));
        map.insert("to".into(), Value::String(self.to.clone()));
        map.insert("amount".into(), canonical_amount(self.amount));
        map.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        Value::Object(map)
    }

    /// Compact canonical JSON. Used both for Merkle leaves and the block preimage.
    pub fn canonical_json(&self) -> String {
        self.canonical_value().to_string()
    }
}

/// JSON numbers cannot carry NaN or infinities; spell those out so distinct
/// amounts never share an encoding.
fn canonical_amount(amount: f64) -> Value {
    if amount.is_finite() {
        Value::from(amount)
    } else {
        Value::String(amount.to_string())
    }
}

/// Canonical JSON array of a transaction batch, order preserved.
pub fn canonical_batch_json(transactions: &[Transaction]) -> String {
    Value::Array(transactions.iter().map(Transaction::canonical_value).collect()).to_string()
}
