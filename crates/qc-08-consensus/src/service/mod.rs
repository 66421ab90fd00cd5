//! Ledger Service - Core business logic
//!
//! # Architecture
//! - Proof-of-Authority: only identities in the `ValidatorSet` seal blocks
//! - Gossiped blocks get the same full validation as locally sealed ones
//! - Longest valid chain wins; ties keep the incumbent
//!
//! # Locking
//! Chain `RwLock` first, then pool `Mutex`. `mine` holds both for the whole
//! drain/seal/append sequence so a failed seal can restore the batch before
//! anyone else observes the empty pool.

use crate::domain::{
    prefers_candidate, seal, ChainState, IngestOutcome, LedgerConfig, LedgerError,
    LedgerResult, ReplaceOutcome, ValidatorSet,
};
use crate::ports::{LedgerApi, SystemTimeSource, TimeSource};
use crate::state::LedgerState;
use crate::validation::BlockValidator;
use qc_06_mempool::{MempoolConfig, TransactionPool};
use shared_crypto::SignatureScheme;
use shared_types::{Block, Transaction};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The ledger: chain, pending pool, validator set and signature backend.
///
/// Built once at startup and shared as `Arc<Ledger<S>>`.
pub struct Ledger<S: SignatureScheme> {
    scheme: Arc<S>,
    validators: ValidatorSet,
    state: LedgerState,
    time_source: Box<dyn TimeSource>,
}

impl<S: SignatureScheme> Ledger<S> {
    /// Create a ledger holding only the genesis block.
    pub fn new(scheme: Arc<S>, config: LedgerConfig) -> LedgerResult<Self> {
        let pool = TransactionPool::new(MempoolConfig {
            capacity: config.pool_capacity,
        });
        info!(
            validators = config.validators.len(),
            pool_capacity = config.pool_capacity,
            scheme = scheme.name(),
            "[qc-08] Ledger initialized at genesis"
        );
        Ok(Self {
            scheme,
            validators: config.validators,
            state: LedgerState::new(ChainState::with_genesis()?, pool),
            time_source: Box::new(SystemTimeSource),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Signature backend in use.
    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Authorized validators.
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    // === COMMANDS ===

    /// Queue a transaction. No validity check happens here; invalid
    /// transactions make the block that carries them fail validation.
    pub fn submit(&self, tx: Transaction) -> LedgerResult<()> {
        self.state.pool.lock().submit(tx)?;
        Ok(())
    }

    /// Seal every pending transaction into a new block on the tip.
    ///
    /// # Errors
    /// - `UnauthorizedValidator` if `validator_id` is not in the set
    /// - `EmptyPool` if nothing is pending
    /// - any `ValidateBlock` failure; the drained batch is restored to the
    ///   front of the pool
    pub fn mine(&self, validator_id: &str) -> LedgerResult<Block> {
        if !self.validators.contains(validator_id) {
            warn!(validator = validator_id, "[qc-08] Mining refused: unauthorized validator");
            return Err(LedgerError::UnauthorizedValidator(validator_id.to_string()));
        }

        let mut chain = self.state.chain.write();
        let mut pool = self.state.pool.lock();
        if pool.is_empty() {
            return Err(LedgerError::EmptyPool);
        }

        let tip = chain.tip();
        let batch = pool.drain();
        let candidate = Block::unsealed(
            tip.index + 1,
            validator_id,
            batch.clone(),
            tip.hash.clone(),
            self.time_source.now_iso(),
        );

        let validated = seal(candidate).and_then(|block| {
            BlockValidator::validate_block(&*self.scheme, &block, chain.blocks())?;
            Ok(block)
        });

        match validated {
            Ok(block) => {
                chain.push(block.clone());
                info!(
                    index = block.index,
                    validator = validator_id,
                    txs = block.transactions.len(),
                    hash = %block.hash,
                    "[qc-08] Block sealed"
                );
                Ok(block)
            }
            Err(err) => {
                pool.restore(batch);
                warn!(error = %err, "[qc-08] Sealed block failed validation, batch restored");
                Err(err)
            }
        }
    }

    /// Adopt `candidate` if it is valid and strictly longer than the local
    /// chain. Validation runs without holding the chain lock.
    pub fn replace_if_better(&self, candidate: Vec<Block>) -> ReplaceOutcome {
        let local_len = self.state.chain.read().len();
        if !prefers_candidate(local_len, candidate.len()) {
            debug!(candidate = candidate.len(), local = local_len, "[qc-08] Candidate chain not longer");
            return ReplaceOutcome::Rejected(LedgerError::NotLonger {
                candidate: candidate.len(),
                local: local_len,
            });
        }
        if let Err(err) = BlockValidator::validate_chain(&*self.scheme, &candidate) {
            warn!(error = %err, "[qc-08] Candidate chain invalid");
            return ReplaceOutcome::Rejected(err);
        }

        let mut chain = self.state.chain.write();
        // The local chain may have grown while the candidate was validated.
        if !prefers_candidate(chain.len(), candidate.len()) {
            return ReplaceOutcome::Rejected(LedgerError::NotLonger {
                candidate: candidate.len(),
                local: chain.len(),
            });
        }
        let length = candidate.len();
        chain.replace(candidate);
        info!(length, "[qc-08] Chain replaced by longer valid chain");
        ReplaceOutcome::Replaced { length }
    }

    /// Apply a gossiped block: duplicates are dropped, anything else must
    /// extend the tip and pass full validation.
    pub fn ingest_block(&self, block: Block) -> IngestOutcome {
        let mut chain = self.state.chain.write();
        if chain.contains_hash(&block.hash) {
            return IngestOutcome::Duplicate;
        }

        let tip = chain.tip();
        if block.index != tip.index + 1 || block.prev_hash != tip.hash {
            debug!(index = block.index, tip = tip.index, "[qc-08] Gossiped block does not extend tip");
            return IngestOutcome::Rejected(LedgerError::NotExtendingTip {
                index: block.index,
                tip: tip.index,
            });
        }

        if let Err(err) = BlockValidator::validate_block(&*self.scheme, &block, chain.blocks()) {
            warn!(index = block.index, error = %err, "[qc-08] Gossiped block invalid");
            return IngestOutcome::Rejected(err);
        }

        info!(index = block.index, validator = %block.validator, "[qc-08] Appended gossiped block");
        chain.push(block);
        IngestOutcome::Appended
    }

    // === QUERIES ===

    /// `ValidateBlock` against the local chain.
    pub fn validate_block(&self, block: &Block) -> LedgerResult<()> {
        let chain = self.state.chain.read();
        BlockValidator::validate_block(&*self.scheme, block, chain.blocks())
    }

    /// `ValidateChain` on a candidate, against itself.
    pub fn validate_chain(&self, chain: &[Block]) -> LedgerResult<()> {
        BlockValidator::validate_chain(&*self.scheme, chain)
    }

    /// Boolean form of [`Ledger::validate_block`].
    pub fn is_valid_block(&self, block: &Block) -> bool {
        self.validate_block(block).is_ok()
    }

    /// Boolean form of [`Ledger::validate_chain`].
    pub fn is_valid_chain(&self, chain: &[Block]) -> bool {
        self.validate_chain(chain).is_ok()
    }

    pub fn chain(&self) -> Vec<Block> {
        self.state.chain.read().blocks().to_vec()
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.state.pool.lock().snapshot()
    }

    pub fn block_by_index(&self, index: u64) -> Option<Block> {
        self.state.chain.read().get(index).cloned()
    }

    pub fn tip(&self) -> Block {
        self.state.chain.read().tip().clone()
    }

    pub fn len(&self) -> usize {
        self.state.chain.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.chain.read().is_empty()
    }

    pub fn pool_size(&self) -> usize {
        self.state.pool.lock().len()
    }
}

impl<S: SignatureScheme> LedgerApi for Ledger<S> {
    fn submit(&self, tx: Transaction) -> LedgerResult<()> {
        Ledger::submit(self, tx)
    }

    fn mine(&self, validator_id: &str) -> LedgerResult<Block> {
        Ledger::mine(self, validator_id)
    }

    fn replace_if_better(&self, candidate: Vec<Block>) -> ReplaceOutcome {
        Ledger::replace_if_better(self, candidate)
    }

    fn ingest_block(&self, block: Block) -> IngestOutcome {
        Ledger::ingest_block(self, block)
    }

    fn chain(&self) -> Vec<Block> {
        Ledger::chain(self)
    }

    fn pending(&self) -> Vec<Transaction> {
        Ledger::pending(self)
    }

    fn block_by_index(&self, index: u64) -> Option<Block> {
        Ledger::block_by_index(self, index)
    }

    fn tip(&self) -> Block {
        Ledger::tip(self)
    }

    fn len(&self) -> usize {
        Ledger::len(self)
    }

    fn pool_size(&self) -> usize {
        Ledger::pool_size(self)
    }
}
