//! Driving ports (Inbound API)

use crate::domain::{IngestOutcome, LedgerResult, ReplaceOutcome};
use shared_types::{Block, Transaction};

/// Primary Ledger API
///
/// The boundary the request layer and the P2P transport call through. Every
/// method is synchronous and may block on the ledger locks, so async callers
/// run them on the blocking pool.
pub trait LedgerApi: Send + Sync {
    /// Queue a transaction. Fails only when the pool is full.
    fn submit(&self, tx: Transaction) -> LedgerResult<()>;

    /// Seal the pending transactions into a block on the tip.
    fn mine(&self, validator_id: &str) -> LedgerResult<Block>;

    /// Adopt `candidate` if it is valid and strictly longer.
    fn replace_if_better(&self, candidate: Vec<Block>) -> ReplaceOutcome;

    /// Apply a gossiped block.
    fn ingest_block(&self, block: Block) -> IngestOutcome;

    /// Copy of the full chain.
    fn chain(&self) -> Vec<Block>;

    /// Copy of the pending transactions.
    fn pending(&self) -> Vec<Transaction>;

    /// Block at `index`, if present.
    fn block_by_index(&self, index: u64) -> Option<Block>;

    /// Latest block.
    fn tip(&self) -> Block;

    /// Number of blocks.
    fn len(&self) -> usize;

    /// Never true for a ledger built with genesis.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pending transactions.
    fn pool_size(&self) -> usize;
}
