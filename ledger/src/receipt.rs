//! Execution receipts.

use claimroot_common::{ReceiptId, Timestamp, VaultLevel};
use claimroot_crypto::ChainHasher;
use serde::{Deserialize, Serialize};

use crate::block::{Block, GENESIS_ISSUER, GENESIS_PREVIOUS_HASH};
use crate::transaction::Transaction;

/// Prefix of every receipt signature.
pub const SIGNATURE_PREFIX: &str = "VAULT7-";

/// Issuing authority details stamped on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    pub issuer: String,
    pub authority: String,
    pub compliance: String,
}

impl Default for ReceiptMetadata {
    fn default() -> Self {
        Self {
            issuer: "VaultChain".to_string(),
            authority: GENESIS_ISSUER.to_string(),
            compliance: "FAA-TREATY-COMPLIANT".to_string(),
        }
    }
}

/// Proof that a transaction was executed against the chain at a given height.
///
/// Receipts are not blocks; they reference the chain height at mint time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: ReceiptId,
    pub vault_level: VaultLevel,
    pub level_name: String,
    pub transaction: Transaction,
    /// Number of blocks in the chain when the receipt was minted.
    pub block_height: u64,
    pub timestamp: Timestamp,
    pub verified: bool,
    pub signature: String,
    pub metadata: ReceiptMetadata,
}

impl Receipt {
    pub(crate) fn mint(
        transaction: Transaction,
        block_height: u64,
        timestamp: Timestamp,
        hasher: &dyn ChainHasher,
    ) -> Self {
        let signature = Self::sign(&transaction, timestamp, hasher);
        let vault_level = VaultLevel::NEXUS_SOVEREIGN;

        Self {
            receipt_id: ReceiptId::new(),
            vault_level,
            level_name: vault_level.name().to_string(),
            transaction,
            block_height,
            timestamp,
            verified: true,
            signature,
            metadata: ReceiptMetadata::default(),
        }
    }

    fn sign(transaction: &Transaction, timestamp: Timestamp, hasher: &dyn ChainHasher) -> String {
        let preimage = Block::preimage(
            0,
            timestamp,
            std::slice::from_ref(transaction),
            GENESIS_PREVIOUS_HASH,
        );
        format!("{}{}", SIGNATURE_PREFIX, hasher.digest(&preimage))
    }

    /// Recompute the signature and compare.
    pub fn verify_signature(&self, hasher: &dyn ChainHasher) -> bool {
        self.signature == Self::sign(&self.transaction, self.timestamp, hasher)
    }
}
