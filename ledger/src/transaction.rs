//! Ledger transaction types.

use claimroot_common::{Address, ClaimRootError, Result, Timestamp, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// A member joined; amount is the granted voting power.
    MemberRegistration,
    /// A proposal was opened.
    ProposalCreated,
    /// A vote was cast; amount is the voter's power.
    VoteCast,
    /// A passed proposal was executed.
    ProposalExecuted,
    /// Plain value transfer between addresses.
    Transfer,
}

/// A transaction before it is queued.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub amount: Decimal,
    pub tx_type: TransactionType,
    pub metadata: Value,
}

impl TransactionRequest {
    /// Create a request with empty metadata.
    pub fn new(
        from: impl Into<Address>,
        to: impl Into<Address>,
        amount: Decimal,
        tx_type: TransactionType,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            tx_type,
            metadata: Value::Null,
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Both addresses must be present.
    pub fn validate(&self) -> Result<()> {
        if self.from.is_blank() {
            return Err(ClaimRootError::missing_field("from"));
        }
        if self.to.is_blank() {
            return Err(ClaimRootError::missing_field("to"));
        }
        Ok(())
    }
}

/// A queued or committed ledger transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// Debited address.
    pub from: Address,
    /// Credited address.
    pub to: Address,
    /// Amount moved.
    pub amount: Decimal,
    /// Transaction kind.
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// When the transaction was queued.
    pub timestamp: Timestamp,
    /// Free-form context.
    pub metadata: Value,
}

impl Transaction {
    pub(crate) fn from_request(request: TransactionRequest, timestamp: Timestamp) -> Self {
        Self {
            id: TransactionId::new(),
            from: request.from,
            to: request.to,
            amount: request.amount,
            tx_type: request.tx_type,
            timestamp,
            metadata: request.metadata,
        }
    }

    /// Whether `address` is on either side.
    pub fn touches(&self, address: &Address) -> bool {
        &self.from == address || &self.to == address
    }

    /// Net effect on `address`: `-amount` as sender, `+amount` as receiver.
    pub fn signed_amount_for(&self, address: &Address) -> Decimal {
        let mut delta = Decimal::ZERO;
        if &self.from == address {
            delta -= self.amount;
        }
        if &self.to == address {
            delta += self.amount;
        }
        delta
    }
}
