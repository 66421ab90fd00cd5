//! # Quantum-Chain Node Runtime
//!
//! Entry point for one ledger node.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, `QC_CONFIG` file, `QC_*` env)
//! 2. Initialize logging (`RUST_LOG`, else the configured level)
//! 3. Build the ledger at genesis and the transport around it
//! 4. Bind the P2P listener
//! 5. Start scan, discovery and sync tasks, plus mining if a validator id is set
//! 6. Run until Ctrl+C, then shut everything down
//!
//! ## Subsystems
//!
//! 1. Peer Discovery (qc-01) - peer table
//! 5. Block Propagation (qc-05) - TCP gossip and sync
//! 6. Mempool (qc-06) - pending transactions
//! 8. Consensus (qc-08) - PoA ledger

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use node_runtime::{load_config, spawn_mining_task, NodeConfig, SubsystemContainer};
use qc_05_block_propagation::spawn_background_tasks;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main node runtime orchestrating all subsystems.
pub struct NodeRuntime {
    /// Subsystem container with all initialized services.
    container: SubsystemContainer,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
    /// Background tasks owned by the runtime.
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating Quantum-Chain node runtime");
        let container =
            SubsystemContainer::new(config).context("Failed to initialize the ledger")?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    /// Bind the listener and start every background task.
    pub async fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Quantum-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let transport = Arc::clone(&self.container.transport);
        let bound = transport
            .start()
            .await
            .context("Failed to start P2P transport")?;

        self.tasks.extend(spawn_background_tasks(&transport));

        let mining = &self.container.config.mining;
        if let Some(validator_id) = mining.validator_id.clone() {
            self.tasks.push(spawn_mining_task(
                self.container.ledger_api(),
                Arc::clone(&transport),
                validator_id,
                mining.interval(),
                self.shutdown_rx.clone(),
            ));
        }

        info!(
            p2p = %bound,
            chain_length = self.container.ledger.len(),
            genesis = %self.container.ledger.tip().hash,
            "Node started"
        );
        Ok(())
    }

    /// Signal shutdown and wait briefly for tasks to finish.
    pub async fn shutdown(self) {
        let Self {
            container,
            shutdown_tx,
            tasks,
            ..
        } = self;

        info!("Initiating graceful shutdown...");
        shutdown_tx.send_replace(true);
        container.transport.shutdown();

        let drained = tokio::time::timeout(Duration::from_secs(2), async move {
            for task in tasks {
                let _ = task.await;
            }
        })
        .await;
        if drained.is_err() {
            info!("Background tasks did not stop in time");
        }
        info!(chain_length = container.ledger.len(), "Shutdown complete");
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.logging.level)?;

    let mut runtime = NodeRuntime::new(config)?;
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
