//! Test nodes bound to ephemeral loopback ports.

use qc_01_peer_discovery::DiscoveryConfig;
use qc_05_block_propagation::{P2PTransport, TransportConfig};
use qc_08_consensus::{signed_register, Ledger, LedgerConfig};
use shared_crypto::{Ed25519Scheme, SignatureScheme};
use shared_types::{PeerAddress, Transaction};
use std::sync::Arc;
use std::time::Duration;

/// One ledger plus its running transport.
pub struct TestNode {
    pub ledger: Arc<Ledger<Ed25519Scheme>>,
    pub transport: Arc<P2PTransport>,
    pub addr: PeerAddress,
}

impl TestNode {
    /// Start a node on a free port. No background tasks run; tests drive
    /// connections explicitly.
    pub async fn start() -> Self {
        let ledger = Arc::new(
            Ledger::new(Arc::new(Ed25519Scheme), LedgerConfig::default())
                .expect("genesis is valid"),
        );
        let config = TransportConfig {
            port: 0,
            ..TransportConfig::default()
        };
        let transport = P2PTransport::new(config, DiscoveryConfig::default(), ledger.clone());
        let bound = transport.start().await.expect("bind loopback");
        let addr = PeerAddress::from_socket_addr(bound).expect("IPv4 loopback");
        Self {
            ledger,
            transport,
            addr,
        }
    }

    pub async fn connect(&self, other: &TestNode) {
        let connected = self
            .transport
            .connect_to_peer(other.addr)
            .await
            .expect("loopback connect");
        assert!(connected, "{} already knew {}", self.addr, other.addr);
    }

    /// Submit one REGISTER and mine it as `validator_001`.
    pub fn mine_register(&self, sender: &str) -> shared_types::Block {
        self.ledger.submit(register(sender)).expect("pool has room");
        self.ledger.mine("validator_001").expect("authorized validator")
    }

    pub fn shutdown(&self) {
        self.transport.shutdown();
    }
}

pub fn register(sender: &str) -> Transaction {
    let keys = Ed25519Scheme.generate_keypair();
    signed_register(&Ed25519Scheme, &keys, sender, "kyber_pub").expect("ed25519 signs")
}

/// Poll `condition` every 20ms for up to 5s.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..250 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
