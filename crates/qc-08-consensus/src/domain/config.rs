//! Ledger configuration.

use super::validator::ValidatorSet;
use qc_06_mempool::DEFAULT_POOL_CAPACITY;
use serde::{Deserialize, Serialize};

/// Ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Identities allowed to seal blocks.
    pub validators: ValidatorSet,
    /// Maximum number of pending transactions.
    pub pool_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            validators: ValidatorSet::default(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}
