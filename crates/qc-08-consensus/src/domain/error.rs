//! Error types for the ledger.

use shared_types::{CodecError, TransactionError};

/// Ledger error types.
///
/// Every rejected operation leaves chain and pool exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Block {index}: hash mismatch (stored {stored}, computed {computed})")]
    HashMismatch {
        index: u64,
        stored: String,
        computed: String,
    },

    #[error("Block {index}: does not link to its predecessor")]
    LinkageMismatch { index: u64 },

    #[error("Block {index}: no block at index {parent} to link to")]
    UnknownParent { index: u64, parent: u64 },

    #[error("Block {index}: does not extend tip {tip}")]
    NotExtendingTip { index: u64, tip: u64 },

    #[error("Unauthorized validator: {0}")]
    UnauthorizedValidator(String),

    #[error("Block {index}: invalid signature on transaction {position}")]
    InvalidSignature { index: u64, position: usize },

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Transaction pool full (capacity {capacity})")]
    PoolFull { capacity: usize },

    #[error("Transaction pool is empty")]
    EmptyPool,

    #[error("Chain is empty")]
    EmptyChain,

    #[error("First block has index {0}, expected 0")]
    MissingGenesis(u64),

    #[error("Candidate chain ({candidate} blocks) is not longer than local chain ({local} blocks)")]
    NotLonger { candidate: usize, local: usize },

    #[error("Encoding failed: {0}")]
    Codec(String),
}

impl From<CodecError> for LedgerError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err.to_string())
    }
}

impl From<qc_06_mempool::MempoolError> for LedgerError {
    fn from(err: qc_06_mempool::MempoolError) -> Self {
        match err {
            qc_06_mempool::MempoolError::PoolFull { capacity } => Self::PoolFull { capacity },
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
