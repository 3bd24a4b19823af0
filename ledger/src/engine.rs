//! Core ledger implementation.

use std::sync::Arc;

use claimroot_common::{Address, ClaimRootError, Clock, Result, SystemClock, VaultLevel};
use claimroot_crypto::{ChainHasher, Sha256Hasher};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::block::Block;
use crate::history::HistoryEntry;
use crate::receipt::Receipt;
use crate::transaction::{Transaction, TransactionRequest};

/// Summary of the chain for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStats {
    pub total_blocks: usize,
    pub pending_transactions: usize,
    pub is_valid: bool,
    pub hash_algorithm: String,
    pub genesis_block: Block,
    pub latest_block: Block,
}

/// Serializable ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub chain: Vec<Block>,
    pub pending: Vec<Transaction>,
}

/// Append-only block ledger.
///
/// Single writer: mutation takes `&mut self`. The chain always contains the
/// genesis block.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    hasher: Arc<dyn ChainHasher>,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Create a ledger holding only a fresh genesis block.
    pub fn new(hasher: Arc<dyn ChainHasher>, clock: Arc<dyn Clock>) -> Self {
        let genesis = Block::genesis(clock.now(), hasher.as_ref());

        info!(
            hash = %genesis.hash,
            algorithm = hasher.name(),
            "Genesis block created"
        );

        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            hasher,
            clock,
        }
    }

    /// Rebuild a ledger from a snapshot, refusing chains that do not verify.
    pub fn restore(
        snapshot: LedgerSnapshot,
        hasher: Arc<dyn ChainHasher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if snapshot.chain.first().map_or(true, |b| !b.is_genesis()) {
            return Err(ClaimRootError::IntegrityViolation(
                "snapshot does not start with a genesis block".to_string(),
            ));
        }

        let ledger = Self {
            chain: snapshot.chain,
            pending: snapshot.pending,
            hasher,
            clock,
        };

        if let Some(index) = ledger.first_invalid_block() {
            return Err(ClaimRootError::IntegrityViolation(format!(
                "block {index} failed verification"
            )));
        }

        info!(blocks = ledger.chain.len(), "Ledger restored from snapshot");
        Ok(ledger)
    }

    /// Queue a transaction for the next commit.
    #[instrument(skip(self, request), fields(from = %request.from, to = %request.to, tx_type = ?request.tx_type))]
    pub fn queue_transaction(&mut self, request: TransactionRequest) -> Result<Transaction> {
        request.validate()?;

        let transaction = Transaction::from_request(request, self.clock.now());
        debug!(tx_id = %transaction.id, pending = self.pending.len() + 1, "Transaction queued");

        self.pending.push(transaction.clone());
        Ok(transaction)
    }

    /// Move every pending transaction into one new block.
    ///
    /// An empty queue still produces a block.
    #[instrument(skip(self), fields(committer = %committer))]
    pub fn commit_pending(&mut self, committer: &Address) -> Block {
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::next(
            self.latest_block(),
            self.clock.now(),
            transactions,
            committer.clone(),
            self.hasher.as_ref(),
        );

        info!(
            block_index = block.index,
            transactions = block.transactions.len(),
            hash = %block.hash,
            "Block committed"
        );

        self.chain.push(block.clone());
        block
    }

    /// Mint a receipt for `transaction` at the current chain height.
    pub fn mint_receipt(&self, transaction: &Transaction) -> Receipt {
        let receipt = Receipt::mint(
            transaction.clone(),
            self.height(),
            self.clock.now(),
            self.hasher.as_ref(),
        );

        info!(
            receipt_id = %receipt.receipt_id,
            tx_id = %transaction.id,
            block_height = receipt.block_height,
            "Receipt minted"
        );

        receipt
    }

    /// Check every block's hash and back-link.
    pub fn verify_integrity(&self) -> bool {
        match self.first_invalid_block() {
            Some(index) => {
                warn!(block_index = index, "Chain integrity check failed");
                false
            }
            None => true,
        }
    }

    /// Index of the first block whose hash or link does not check out.
    pub fn first_invalid_block(&self) -> Option<u64> {
        self.chain.windows(2).find_map(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            let valid = current.has_valid_hash(self.hasher.as_ref()) && current.links_to(previous);
            (!valid).then_some(current.index)
        })
    }

    /// Replay the chain and sum the net effect on `address`.
    pub fn balance_of(&self, address: &Address) -> Decimal {
        self.committed()
            .map(|(_, tx)| tx.signed_amount_for(address))
            .sum()
    }

    /// Every committed transaction touching `address`, in chain order.
    pub fn history_of(&self, address: &Address) -> Vec<HistoryEntry> {
        self.committed()
            .filter(|(_, tx)| tx.touches(address))
            .map(|(block, tx)| HistoryEntry {
                transaction: tx.clone(),
                block_index: block.index,
                block_hash: block.hash.clone(),
                block_timestamp: block.timestamp,
            })
            .collect()
    }

    /// Chain summary.
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            total_blocks: self.chain.len(),
            pending_transactions: self.pending.len(),
            is_valid: self.verify_integrity(),
            hash_algorithm: self.hasher.name().to_string(),
            genesis_block: self.genesis_block().clone(),
            latest_block: self.latest_block().clone(),
        }
    }

    pub fn latest_block(&self) -> &Block {
        &self.chain[self.chain.len() - 1]
    }

    pub fn genesis_block(&self) -> &Block {
        &self.chain[0]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Number of blocks, genesis included.
    pub fn height(&self) -> u64 {
        self.chain.len() as u64
    }

    /// Name of a numeric vault level; fails outside 1..=7.
    pub fn vault_level_name(&self, level: u8) -> Result<&'static str> {
        Ok(VaultLevel::new(level)?.name())
    }

    pub fn hasher(&self) -> &dyn ChainHasher {
        self.hasher.as_ref()
    }

    /// Copy of the chain and pending queue.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            chain: self.chain.clone(),
            pending: self.pending.clone(),
        }
    }

    fn committed(&self) -> impl Iterator<Item = (&Block, &Transaction)> {
        self.chain
            .iter()
            .flat_map(|block| block.transactions.iter().map(move |tx| (block, tx)))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Arc::new(Sha256Hasher), Arc::new(SystemClock))
    }
}
