use crate::domain::ChainState;
use parking_lot::{Mutex, RwLock};
use qc_06_mempool::TransactionPool;

/// Mutable state of the ledger.
///
/// Lock order is `chain` then `pool`. Any path that needs both takes them in
/// that order.
pub struct LedgerState {
    pub chain: RwLock<ChainState>,
    pub pool: Mutex<TransactionPool>,
}

impl LedgerState {
    pub fn new(chain: ChainState, pool: TransactionPool) -> Self {
        Self {
            chain: RwLock::new(chain),
            pool: Mutex::new(pool),
        }
    }
}
