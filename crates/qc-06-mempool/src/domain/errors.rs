//! Mempool error types.

use thiserror::Error;

/// Mempool error type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MempoolError {
    /// Pool has reached maximum capacity.
    #[error("Transaction pool full (capacity {capacity})")]
    PoolFull { capacity: usize },
}
