//! Local block production.
//!
//! Every `mining.interval_secs` the node seals its pending pool as
//! `mining.validator_id` and announces the block.

use qc_05_block_propagation::P2PTransport;
use qc_08_consensus::{LedgerApi, LedgerError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Result of one mining attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiningTick {
    /// A block was sealed and sent to this many peers.
    Sealed { index: u64, peers: usize },
    /// Nothing pending.
    Idle,
    /// Mining was refused or the sealed block failed validation.
    Failed(LedgerError),
}

/// Seal and announce once.
pub async fn mine_once(
    ledger: &Arc<dyn LedgerApi>,
    transport: &P2PTransport,
    validator_id: &str,
) -> MiningTick {
    let api = Arc::clone(ledger);
    let validator = validator_id.to_string();
    let mined = match tokio::task::spawn_blocking(move || api.mine(&validator)).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "[qc-08] Mining task failed");
            return MiningTick::Idle;
        }
    };

    match mined {
        Ok(block) => {
            let peers = match transport.announce_block(&block) {
                Ok(peers) => peers,
                Err(err) => {
                    warn!(index = block.index, error = %err, "[qc-05] Failed to encode block");
                    0
                }
            };
            MiningTick::Sealed {
                index: block.index,
                peers,
            }
        }
        Err(LedgerError::EmptyPool) => MiningTick::Idle,
        Err(err) => {
            warn!(validator = validator_id, error = %err, "[qc-08] Mining failed");
            MiningTick::Failed(err)
        }
    }
}

/// Periodic `mine_once` until `shutdown` flips.
pub fn spawn_mining_task(
    ledger: Arc<dyn LedgerApi>,
    transport: Arc<P2PTransport>,
    validator_id: String,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(validator = %validator_id, every = ?period, "[qc-08] Mining task started");
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    if let MiningTick::Sealed { index, peers } =
                        mine_once(&ledger, &transport, &validator_id).await
                    {
                        debug!(index, peers, "[qc-08] Mining tick produced a block");
                    }
                }
            }
        }
        info!("[qc-08] Mining task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{NodeConfig, SubsystemContainer};
    use qc_08_consensus::signed_register;
    use shared_crypto::{Ed25519Scheme, SignatureScheme};

    fn container() -> SubsystemContainer {
        let mut config = NodeConfig::default();
        config.network.transport.port = 0;
        SubsystemContainer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_mine_once_idle_on_empty_pool() {
        let c = container();
        let tick = mine_once(&c.ledger_api(), &c.transport, "validator_001").await;
        assert_eq!(tick, MiningTick::Idle);
    }

    #[tokio::test]
    async fn test_mine_once_seals_pending() {
        let c = container();
        let keys = Ed25519Scheme.generate_keypair();
        c.ledger
            .submit(signed_register(&Ed25519Scheme, &keys, "addr1", "kyber").unwrap())
            .unwrap();

        let tick = mine_once(&c.ledger_api(), &c.transport, "validator_001").await;

        assert_eq!(tick, MiningTick::Sealed { index: 1, peers: 0 });
        assert_eq!(c.ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_mine_once_unauthorized() {
        let c = container();
        let keys = Ed25519Scheme.generate_keypair();
        c.ledger
            .submit(signed_register(&Ed25519Scheme, &keys, "addr1", "kyber").unwrap())
            .unwrap();

        let tick = mine_once(&c.ledger_api(), &c.transport, "nobody").await;

        assert_eq!(
            tick,
            MiningTick::Failed(LedgerError::UnauthorizedValidator("nobody".into()))
        );
        assert_eq!(c.ledger.pool_size(), 1);
    }

    #[tokio::test]
    async fn test_mining_task_stops_on_shutdown() {
        let c = container();
        let (tx, rx) = watch::channel(false);
        let handle = spawn_mining_task(
            c.ledger_api(),
            Arc::clone(&c.transport),
            "validator_001".into(),
            Duration::from_secs(60),
            rx,
        );

        tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
