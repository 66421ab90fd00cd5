//! # Subsystem Instances
//!
//! Builds the ledger (qc-08, with its pool from qc-06) and the transport
//! (qc-05, with its peer table from qc-01). The ledger is created once and
//! shared as `Arc`; the transport only sees it through `LedgerApi`.

use super::config::NodeConfig;
use qc_05_block_propagation::P2PTransport;
use qc_08_consensus::{Ledger, LedgerApi, LedgerResult};
use shared_crypto::Ed25519Scheme;
use std::sync::Arc;
use tracing::{info, warn};

/// Ledger backed by the default signature scheme.
pub type NodeLedger = Ledger<Ed25519Scheme>;

/// Container holding all subsystem instances.
pub struct SubsystemContainer {
    pub config: NodeConfig,
    pub ledger: Arc<NodeLedger>,
    pub transport: Arc<P2PTransport>,
}

impl SubsystemContainer {
    pub fn new(config: NodeConfig) -> LedgerResult<Self> {
        let ledger = Arc::new(Ledger::new(Arc::new(Ed25519Scheme), config.ledger.clone())?);

        if let Some(validator) = &config.mining.validator_id {
            if !ledger.validators().contains(validator) {
                warn!(validator = %validator, "[qc-08] Configured validator is not authorized; mining will be refused");
            }
        }

        let api: Arc<dyn LedgerApi> = ledger.clone();
        let transport = P2PTransport::new(
            config.network.transport.clone(),
            config.network.discovery.clone(),
            api,
        );
        info!(
            host = %config.network.transport.host,
            port = config.network.transport.port,
            "Subsystems initialized"
        );

        Ok(Self {
            config,
            ledger,
            transport,
        })
    }

    pub fn ledger_api(&self) -> Arc<dyn LedgerApi> {
        self.ledger.clone()
    }
}
