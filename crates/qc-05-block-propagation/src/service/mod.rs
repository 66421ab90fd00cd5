//! # P2P Transport Service
//!
//! Owns the TCP listener, every live connection and the peer table, and
//! routes decoded messages to the ledger.
//!
//! ## Message Routing
//!
//! | Inbound | Action |
//! |---------|--------|
//! | PEER_LIST | connect to every unknown, non-failed, non-self address |
//! | TEXT_MSG | logged |
//! | NEW_BLOCK | `ingest_block`; relayed to everyone but the sender when appended |
//! | BLOCKCHAIN_REQUEST | reply BLOCKCHAIN_RESPONSE with the full chain |
//! | BLOCKCHAIN_RESPONSE | `replace_if_better` |
//! | GET_BLOCK_BY_INDEX | reply BLOCK_RESPONSE |
//! | BLOCK_RESPONSE | `ingest_block` when it carries a block |
//!
//! ## Self-Connections
//!
//! A dial can reach our own listener through an address the peer table does
//! not know as self (another local interface, a wildcard bind). The local end
//! of every outbound dial is remembered until that connection closes; an
//! accepted connection whose remote end matches one is our own dial looping
//! back. Both ends are closed and the dialed address becomes a self alias.
//!
//! ## Concurrency
//!
//! The peer table sits behind one `parking_lot::Mutex` that is never held
//! across an await. When both are needed, `self_dials` is locked before
//! `peers`. Ingest and chain replacement run on the blocking pool.
//! All tasks observe one `watch` shutdown signal.

mod connection;
mod tasks;

pub use connection::ConnectionHandle;
pub use tasks::{spawn_background_tasks, spawn_discovery_task, spawn_scan_task, spawn_sync_task};

use crate::domain::{TransportConfig, TransportError, WireError, WireMessage};
use parking_lot::Mutex;
use qc_01_peer_discovery::{DiscoveryConfig, PeerTable};
use qc_08_consensus::{IngestOutcome, LedgerApi, LedgerError, ReplaceOutcome};
use shared_types::{Block, PeerAddress};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// One encoded message, shared between every connection it is sent to.
pub type Frame = Arc<Vec<u8>>;

/// Resolves once `shutdown` flips to true or its sender is gone.
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// TCP transport for one node.
pub struct P2PTransport {
    config: TransportConfig,
    discovery: DiscoveryConfig,
    ledger: Arc<dyn LedgerApi>,
    peers: Mutex<PeerTable<ConnectionHandle>>,
    /// Local end of each live outbound dial → the address dialed.
    self_dials: Mutex<HashMap<PeerAddress, PeerAddress>>,
    next_connection_id: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
}

impl P2PTransport {
    pub fn new(
        config: TransportConfig,
        discovery: DiscoveryConfig,
        ledger: Arc<dyn LedgerApi>,
    ) -> Arc<Self> {
        let local = PeerAddress::new(config.host, config.port);
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            peers: Mutex::new(PeerTable::new(local, discovery.failed_policy())),
            self_dials: Mutex::new(HashMap::new()),
            config,
            discovery,
            ledger,
            next_connection_id: AtomicU64::new(1),
            shutdown_tx,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn discovery(&self) -> &DiscoveryConfig {
        &self.discovery
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerApi> {
        &self.ledger
    }

    /// Our listening address (the real port once `start` returned).
    pub fn local(&self) -> PeerAddress {
        self.peers.lock().local()
    }

    /// Addresses with a live connection, sorted.
    pub fn connected_peers(&self) -> Vec<PeerAddress> {
        let mut peers: Vec<_> = self
            .peers
            .lock()
            .connections()
            .into_iter()
            .map(|(addr, _)| addr)
            .collect();
        peers.sort();
        peers
    }

    /// Whether `addr` reaches this node's own listener.
    pub fn is_self_address(&self, addr: &PeerAddress) -> bool {
        self.peers.lock().is_self(addr)
    }

    pub fn connected_count(&self) -> usize {
        self.peers.lock().connected_count()
    }

    pub fn failed_count(&self) -> usize {
        self.peers.lock().failed_count()
    }

    pub(crate) fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Bind the listener and start accepting. Returns the bound address.
    pub async fn start(self: &Arc<Self>) -> Result<SocketAddr, TransportError> {
        let listener = TcpListener::bind((self.config.host, self.config.port))
            .await
            .map_err(TransportError::Bind)?;
        let bound = listener.local_addr().map_err(TransportError::Bind)?;
        if let Some(local) = PeerAddress::from_socket_addr(bound) {
            self.peers.lock().set_local(local);
        }
        info!(addr = %bound, "[qc-05] P2P listener started");

        tokio::spawn(Arc::clone(self).accept_loop(listener));
        Ok(bound)
    }

    /// Stop the accept loop, every connection and every background task.
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("[qc-05] P2P transport shutting down");
        }
    }

    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        let mut shutdown = self.subscribe_shutdown();
        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => match PeerAddress::from_socket_addr(remote) {
                        Some(peer) => self.accept_connection(stream, peer),
                        None => debug!(remote = %remote, "[qc-05] Ignoring non-IPv4 connection"),
                    },
                    Err(err) => warn!(error = %err, "[qc-05] Accept failed"),
                },
            }
        }
        info!("[qc-05] Accept loop stopped");
    }

    fn accept_connection(self: &Arc<Self>, stream: TcpStream, peer: PeerAddress) {
        let mut dials = self.self_dials.lock();
        if let Some(dialed) = dials.remove(&peer) {
            drop(dials);
            let looped = self.peers.lock().connection(&dialed);
            self.record_self(dialed);
            if let Some(outbound) = looped {
                self.drop_connection(dialed, outbound.id);
            }
            return;
        }
        debug!(peer = %peer, "[qc-05] Accepted connection");
        self.spawn_connection(stream, peer, None);
    }

    fn record_self(&self, dialed: PeerAddress) {
        self.peers.lock().add_self_alias(dialed);
        info!(addr = %dialed, "[qc-05] Dial reached our own listener, address marked as self");
    }

    fn spawn_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        peer: PeerAddress,
        source: Option<PeerAddress>,
    ) -> ConnectionHandle {
        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let (outbound, queue) = mpsc::channel(self.config.outbound_queue.max(1));
        let handle = ConnectionHandle {
            id,
            peer,
            source,
            outbound,
        };

        if let Some(previous) = self.peers.lock().register(peer, handle.clone()) {
            debug!(peer = %peer, replaced = previous.id, "[qc-05] Replaced existing connection");
        }

        let (reader, writer) = stream.into_split();
        let read_task = tokio::spawn(Arc::clone(self).read_loop(reader, peer, id));
        tokio::spawn(Arc::clone(self).write_loop(writer, queue, peer, id, read_task.abort_handle()));
        handle
    }

    pub(crate) fn drop_connection(&self, peer: PeerAddress, id: u64) {
        let removed = self.peers.lock().remove(&peer, id);
        if let Some(connection) = removed {
            if let Some(source) = connection.source {
                self.self_dials.lock().remove(&source);
            }
            info!(peer = %peer, "[qc-05] Peer disconnected");
        }
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    /// Dial `addr`. Returns `Ok(false)` when the address is self (known up
    /// front or found when the dial loops back), already connected or
    /// pending, or excluded by an earlier failure.
    ///
    /// On success the connection is registered and a BLOCKCHAIN_REQUEST is
    /// queued. On failure the address is marked failed.
    pub async fn connect_to_peer(self: &Arc<Self>, addr: PeerAddress) -> Result<bool, TransportError> {
        if !self.peers.lock().begin_connect(addr, Instant::now()) {
            return Ok(false);
        }

        let attempt =
            tokio::time::timeout(self.config.connect_timeout(), TcpStream::connect(addr.socket_addr())).await;
        let stream = match attempt {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(self.connect_failed(addr, err.to_string())),
            Err(_) => return Err(self.connect_failed(addr, "timed out".to_string())),
        };

        let source = stream.local_addr().ok().and_then(PeerAddress::from_socket_addr);
        let handle = {
            let mut dials = self.self_dials.lock();
            if let Some(source) = source {
                // The listener may already have accepted this very dial.
                let looped = self.peers.lock().connection(&source);
                if let Some(inbound) = looped {
                    drop(dials);
                    self.record_self(addr);
                    self.drop_connection(source, inbound.id);
                    return Ok(false);
                }
                dials.insert(source, addr);
            }
            self.spawn_connection(stream, addr, source)
        };
        info!(peer = %addr, "[qc-05] Connected to peer");
        self.deliver(&handle, Arc::new(WireMessage::BlockchainRequest.encode()?));
        Ok(true)
    }

    fn connect_failed(&self, addr: PeerAddress, reason: String) -> TransportError {
        self.peers.lock().mark_failed(addr, Instant::now());
        debug!(peer = %addr, reason = %reason, "[qc-05] Connection attempt failed");
        TransportError::ConnectionFailure { addr, reason }
    }

    fn spawn_connect(self: &Arc<Self>, addr: PeerAddress) {
        let transport = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = transport.connect_to_peer(addr).await {
                debug!(error = %err, "[qc-05] Dial failed");
            }
        });
    }

    /// Queue `frame` on one connection. A closed queue removes the
    /// connection; a full one drops the frame.
    fn deliver(&self, connection: &ConnectionHandle, frame: Frame) -> bool {
        match connection.outbound.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(peer = %connection.peer, "[qc-05] Outbound queue full, message dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.drop_connection(connection.peer, connection.id);
                false
            }
        }
    }

    /// Send `frame` to every live connection except `exclude`. Returns how
    /// many connections accepted it.
    pub fn broadcast(&self, frame: Frame, exclude: Option<PeerAddress>) -> usize {
        let connections = self.peers.lock().connections();
        let mut sent = 0;
        for (addr, connection) in &connections {
            if Some(*addr) == exclude {
                continue;
            }
            if self.deliver(connection, Arc::clone(&frame)) {
                sent += 1;
            }
        }
        sent
    }

    pub fn broadcast_message(
        &self,
        message: &WireMessage,
        exclude: Option<PeerAddress>,
    ) -> Result<usize, WireError> {
        Ok(self.broadcast(Arc::new(message.encode()?), exclude))
    }

    /// Send `message` to `peer` only.
    pub fn send_to(&self, peer: PeerAddress, message: &WireMessage) -> Result<bool, WireError> {
        let frame = Arc::new(message.encode()?);
        let Some(connection) = self.peers.lock().connection(&peer) else {
            return Ok(false);
        };
        Ok(self.deliver(&connection, frame))
    }

    /// Broadcast NEW_BLOCK for a block this node produced.
    pub fn announce_block(&self, block: &Block) -> Result<usize, WireError> {
        let sent = self.broadcast_message(&WireMessage::NewBlock(block.clone()), None)?;
        info!(index = block.index, peers = sent, "[qc-05] Block announced");
        Ok(sent)
    }

    /// Broadcast BLOCKCHAIN_REQUEST.
    pub fn request_sync(&self) -> Result<usize, WireError> {
        self.broadcast_message(&WireMessage::BlockchainRequest, None)
    }

    /// Broadcast a PEER_LIST of shareable connected peers. No-op without
    /// connections.
    pub fn share_peers(&self) -> Result<usize, WireError> {
        let peers = {
            let table = self.peers.lock();
            if table.connected_count() == 0 {
                return Ok(0);
            }
            table.shareable_peers(self.discovery.shareable_ports())
        };
        self.broadcast_message(&WireMessage::PeerList(peers), None)
    }

    /// Dial every probe address that is not self, known or failed. Returns
    /// the number of attempts started.
    pub fn scan_for_peers(self: &Arc<Self>) -> usize {
        let now = Instant::now();
        let targets = {
            let mut table = self.peers.lock();
            table.prune_expired_failures(now);
            table.scan_targets(self.discovery.probe_host, self.discovery.probe_ports(), now)
        };
        for addr in &targets {
            self.spawn_connect(*addr);
        }
        if !targets.is_empty() {
            debug!(targets = targets.len(), "[qc-05] Scanning for peers");
        }
        targets.len()
    }

    // =========================================================================
    // Inbound
    // =========================================================================

    /// Decode and act on one inbound frame from `from`.
    pub async fn dispatch(self: &Arc<Self>, raw: &[u8], from: PeerAddress) -> Result<(), WireError> {
        let message = WireMessage::decode(raw)?;
        match message {
            WireMessage::PeerList(peers) => self.handle_peer_list(peers),
            WireMessage::Text { counter, text } => {
                debug!(peer = %from, counter, text = %text, "[qc-05] Heartbeat");
            }
            WireMessage::NewBlock(block) => {
                let index = block.index;
                if self.ingest(block).await {
                    let relayed = self.broadcast(Arc::new(raw.to_vec()), Some(from));
                    debug!(index, relayed, "[qc-05] Relayed new block");
                }
            }
            WireMessage::BlockchainRequest => {
                let chain = self.ledger.chain();
                self.send_to(from, &WireMessage::BlockchainResponse(chain))?;
            }
            WireMessage::BlockchainResponse(chain) => self.replace_chain(chain, from).await,
            WireMessage::GetBlockByIndex(index) => {
                let block = self.ledger.block_by_index(index);
                self.send_to(from, &WireMessage::BlockResponse(block))?;
            }
            WireMessage::BlockResponse(Some(block)) => {
                self.ingest(block).await;
            }
            WireMessage::BlockResponse(None) => {
                debug!(peer = %from, "[qc-05] Peer does not have requested block");
            }
        }
        Ok(())
    }

    fn handle_peer_list(self: &Arc<Self>, peers: Vec<PeerAddress>) {
        let now = Instant::now();
        let targets: Vec<_> = {
            let table = self.peers.lock();
            peers
                .into_iter()
                .filter(|addr| table.should_connect(addr, now) && !table.is_known(addr))
                .collect()
        };
        for addr in targets {
            self.spawn_connect(addr);
        }
    }

    /// Returns true when the block was appended.
    async fn ingest(&self, block: Block) -> bool {
        let index = block.index;
        match self.with_ledger(move |ledger| ledger.ingest_block(block)).await {
            Some(IngestOutcome::Appended) => true,
            Some(IngestOutcome::Duplicate) | None => false,
            Some(IngestOutcome::Rejected(err)) => {
                warn!(index, error = %err, "[qc-05] Rejected gossiped block");
                false
            }
        }
    }

    async fn replace_chain(&self, chain: Vec<Block>, from: PeerAddress) {
        let offered = chain.len();
        match self.with_ledger(move |ledger| ledger.replace_if_better(chain)).await {
            Some(ReplaceOutcome::Replaced { length }) => {
                info!(peer = %from, length, "[qc-05] Synced longer chain from peer");
            }
            Some(ReplaceOutcome::Rejected(LedgerError::NotLonger { .. })) | None => {}
            Some(ReplaceOutcome::Rejected(err)) => {
                warn!(peer = %from, offered, error = %err, "[qc-05] Rejected peer chain");
            }
        }
    }

    /// Run a ledger call on the blocking pool.
    async fn with_ledger<T, F>(&self, call: F) -> Option<T>
    where
        F: FnOnce(&dyn LedgerApi) -> T + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        match tokio::task::spawn_blocking(move || call(ledger.as_ref())).await {
            Ok(value) => Some(value),
            Err(err) => {
                error!(error = %err, "[qc-05] Ledger task failed");
                None
            }
        }
    }
}
