//! ClaimRoot Ledger
//!
//! Append-only chain of hash-linked blocks. Transactions are queued, then
//! committed in batches; balances and histories are derived by replaying the
//! committed chain.

pub mod engine;
pub mod block;
pub mod transaction;
pub mod receipt;
pub mod history;

pub use engine::{ChainStats, Ledger, LedgerSnapshot};
pub use block::{Block, BlockMetadata};
pub use transaction::{Transaction, TransactionRequest, TransactionType};
pub use receipt::{Receipt, ReceiptMetadata};
pub use history::HistoryEntry;
