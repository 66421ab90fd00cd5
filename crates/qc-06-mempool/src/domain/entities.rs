//! Mempool configuration.

use serde::{Deserialize, Serialize};

/// Default number of pending transactions the pool admits.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Mempool configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolConfig {
    /// Maximum number of pending transactions.
    pub capacity: usize,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}
