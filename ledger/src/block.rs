//! Block definitions for the ledger.

use claimroot_common::{Address, Timestamp, VaultLevel};
use claimroot_crypto::ChainHasher;
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Issuer recorded on the genesis block.
pub const GENESIS_ISSUER: &str = "NEXUS_NAIR";

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Block provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockMetadata {
    /// First block of the chain.
    Genesis { issuer: String, description: String },
    /// Block produced by a commit of pending transactions.
    Committed { committer: Address },
}

/// A committed, hash-linked batch of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain; genesis is 0.
    pub index: u64,
    /// When the block was committed.
    pub timestamp: Timestamp,
    /// Transactions in commit order.
    pub transactions: Vec<Transaction>,
    /// Hash of the preceding block.
    pub previous_hash: String,
    /// Hash over index, timestamp, transactions and previous hash.
    pub hash: String,
    /// Vault level stamped on the block.
    pub vault_level: VaultLevel,
    /// Provenance.
    pub metadata: BlockMetadata,
}

impl Block {
    /// Build the genesis block.
    pub fn genesis(timestamp: Timestamp, hasher: &dyn ChainHasher) -> Self {
        let hash = hasher.digest(&Self::preimage(0, timestamp, &[], GENESIS_PREVIOUS_HASH));

        Self {
            index: 0,
            timestamp,
            transactions: Vec::new(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            hash,
            vault_level: VaultLevel::NEXUS_SOVEREIGN,
            metadata: BlockMetadata::Genesis {
                issuer: GENESIS_ISSUER.to_string(),
                description: "ClaimRoot Genesis Block".to_string(),
            },
        }
    }

    /// Build a block on top of `previous`.
    pub fn next(
        previous: &Block,
        timestamp: Timestamp,
        transactions: Vec<Transaction>,
        committer: Address,
        hasher: &dyn ChainHasher,
    ) -> Self {
        let index = previous.index + 1;
        let hash = hasher.digest(&Self::preimage(
            index,
            timestamp,
            &transactions,
            &previous.hash,
        ));

        Self {
            index,
            timestamp,
            transactions,
            previous_hash: previous.hash.clone(),
            hash,
            vault_level: VaultLevel::NEXUS_SOVEREIGN,
            metadata: BlockMetadata::Committed { committer },
        }
    }

    /// The string that is hashed: `index ‖ millis ‖ json(transactions) ‖ previous_hash`.
    pub fn preimage(
        index: u64,
        timestamp: Timestamp,
        transactions: &[Transaction],
        previous_hash: &str,
    ) -> String {
        // Derived Serialize on these types has no failure path.
        let transactions = serde_json::to_string(transactions).unwrap_or_default();
        format!(
            "{}{}{}{}",
            index,
            timestamp.timestamp_millis(),
            transactions,
            previous_hash
        )
    }

    /// Recompute the hash from this block's own fields.
    pub fn compute_hash(&self, hasher: &dyn ChainHasher) -> String {
        hasher.digest(&Self::preimage(
            self.index,
            self.timestamp,
            &self.transactions,
            &self.previous_hash,
        ))
    }

    /// Stored hash matches the recomputed one.
    pub fn has_valid_hash(&self, hasher: &dyn ChainHasher) -> bool {
        self.hash == self.compute_hash(hasher)
    }

    /// This block points at `previous`.
    pub fn links_to(&self, previous: &Block) -> bool {
        self.previous_hash == previous.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}
