//! Address history entries.

use claimroot_common::Timestamp;
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// A committed transaction annotated with its containing block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub block_index: u64,
    pub block_hash: String,
    pub block_timestamp: Timestamp,
}
