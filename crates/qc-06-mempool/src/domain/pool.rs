//! # Transaction Pool - Bounded FIFO
//!
//! ## Data Structures
//!
//! - `pending`: insertion-ordered `VecDeque<Transaction>`
//!
//! ## Invariants Enforced
//!
//! - `submit()` never grows the pool past `capacity`
//! - `drain()` empties the pool and hands back every transaction in order
//! - `restore()` puts a drained batch back at the front, ignoring capacity,
//!   so a failed seal never loses a transaction

use super::entities::MempoolConfig;
use super::errors::MempoolError;
use shared_types::Transaction;
use std::collections::VecDeque;
use tracing::debug;

/// Pending transactions awaiting inclusion.
#[derive(Debug, Clone)]
pub struct TransactionPool {
    /// Configuration.
    config: MempoolConfig,

    /// Transactions in submission order.
    pending: VecDeque<Transaction>,
}

impl TransactionPool {
    /// Creates a new empty transaction pool.
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            pending: VecDeque::with_capacity(config.capacity),
            config,
        }
    }

    /// Creates a pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MempoolConfig::default())
    }

    /// Maximum number of transactions `submit` admits.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Returns the number of transactions in the pool.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Adds a transaction at the back of the queue.
    ///
    /// # Errors
    /// - `PoolFull` if at capacity
    pub fn submit(&mut self, tx: Transaction) -> Result<(), MempoolError> {
        if self.pending.len() >= self.config.capacity {
            return Err(MempoolError::PoolFull {
                capacity: self.config.capacity,
            });
        }
        self.pending.push_back(tx);
        Ok(())
    }

    /// Removes and returns every pending transaction in submission order.
    pub fn drain(&mut self) -> Vec<Transaction> {
        self.pending.drain(..).collect()
    }

    /// Returns a drained batch to the front of the queue in its original
    /// order. Transactions submitted since the drain stay behind it.
    pub fn restore(&mut self, batch: Vec<Transaction>) {
        if batch.is_empty() {
            return;
        }
        debug!(restored = batch.len(), queued = self.pending.len(), "[qc-06] Restoring drained batch");
        for tx in batch.into_iter().rev() {
            self.pending.push_front(tx);
        }
    }

    /// Copy of the pending transactions in order.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.pending.iter().cloned().collect()
    }
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{PayloadFields, TxKind};

    fn make_tx(sender: &str) -> Transaction {
        let mut data = PayloadFields::new();
        data.insert("message_hash".into(), "00".repeat(32));
        data.insert("signature".into(), "ab".into());
        data.insert("dilithium_pub".into(), "cd".into());
        Transaction::from_fields(TxKind::PublicMessage, sender, "bob", data).unwrap()
    }

    fn pool_with_capacity(capacity: usize) -> TransactionPool {
        TransactionPool::new(MempoolConfig { capacity })
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(TransactionPool::default().capacity(), 100);
    }

    #[test]
    fn test_submit_until_full() {
        let mut pool = TransactionPool::with_defaults();
        for i in 0..100 {
            pool.submit(make_tx(&format!("s{i}"))).unwrap();
        }

        let result = pool.submit(make_tx("late"));
        assert_eq!(result, Err(MempoolError::PoolFull { capacity: 100 }));
        assert_eq!(pool.len(), 100);
    }

    #[test]
    fn test_drain_returns_in_order_and_empties() {
        let mut pool = pool_with_capacity(10);
        pool.submit(make_tx("a")).unwrap();
        pool.submit(make_tx("b")).unwrap();
        pool.submit(make_tx("c")).unwrap();

        let drained = pool.drain();
        let senders: Vec<_> = drained.iter().map(|t| t.sender.as_str()).collect();
        assert_eq!(senders, vec!["a", "b", "c"]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_restore_goes_ahead_of_new_submissions() {
        let mut pool = pool_with_capacity(10);
        pool.submit(make_tx("a")).unwrap();
        pool.submit(make_tx("b")).unwrap();
        let batch = pool.drain();

        pool.submit(make_tx("late")).unwrap();
        pool.restore(batch);

        let senders: Vec<_> = pool.snapshot().into_iter().map(|t| t.sender).collect();
        assert_eq!(senders, vec!["a", "b", "late"]);
    }

    #[test]
    fn test_restore_ignores_capacity() {
        let mut pool = pool_with_capacity(2);
        pool.submit(make_tx("a")).unwrap();
        pool.submit(make_tx("b")).unwrap();
        let batch = pool.drain();

        pool.submit(make_tx("c")).unwrap();
        pool.submit(make_tx("d")).unwrap();
        pool.restore(batch);

        assert_eq!(pool.len(), 4);
        assert!(pool.submit(make_tx("e")).is_err());
    }
}
