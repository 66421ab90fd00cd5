//! # Peer Table
//!
//! Tracks which addresses are known, which have a live connection, and which
//! failed to connect.
//!
//! ## Tables
//!
//! | Table | Contents | Cleared when |
//! |-------|----------|--------------|
//! | `known` | addresses with a live or pending connection | connection closes or fails |
//! | `connected` | address → live connection handle | connection closes |
//! | `failed` | address → time of the failed attempt | successful connect, or policy expiry |
//! | `self_aliases` | other addresses that reach our own listener | never |
//!
//! ## Self
//!
//! An address is self when it equals the listening address, or when it is a
//! recorded alias. A node listening on `0.0.0.0` also treats `127.0.0.1` and
//! `0.0.0.0` on its own port as self. Routes to self through any other local
//! interface are found when a dial loops back, then recorded as aliases.
//!
//! The table holds no lock of its own. The transport wraps it in one mutex
//! and never holds that mutex across an await.

use super::entities::{FailedPeerPolicy, MAX_SHARED_PEERS};
use crate::ports::PeerConnection;
use shared_types::PeerAddress;
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::time::Instant;
use tracing::debug;

/// Known, connected and failed peers of one node.
#[derive(Debug)]
pub struct PeerTable<C> {
    local: PeerAddress,
    policy: FailedPeerPolicy,
    known: HashSet<PeerAddress>,
    connected: HashMap<PeerAddress, C>,
    failed: HashMap<PeerAddress, Instant>,
    self_aliases: HashSet<PeerAddress>,
}

impl<C: PeerConnection> PeerTable<C> {
    /// Empty table for the node listening on `local`.
    pub fn new(local: PeerAddress, policy: FailedPeerPolicy) -> Self {
        Self {
            local,
            policy,
            known: HashSet::new(),
            connected: HashMap::new(),
            failed: HashMap::new(),
            self_aliases: HashSet::new(),
        }
    }

    /// Our own listening address.
    pub fn local(&self) -> PeerAddress {
        self.local
    }

    /// Update our own address once the listener is bound (port 0 resolves
    /// to a real port).
    pub fn set_local(&mut self, local: PeerAddress) {
        self.local = local;
    }

    pub fn is_self(&self, addr: &PeerAddress) -> bool {
        if *addr == self.local || self.self_aliases.contains(addr) {
            return true;
        }
        self.local.ip.is_unspecified()
            && addr.port == self.local.port
            && (addr.ip == Ipv4Addr::LOCALHOST || addr.ip.is_unspecified())
    }

    /// Record that `addr` reaches our own listener. Clears any pending or
    /// failed state for it.
    pub fn add_self_alias(&mut self, addr: PeerAddress) {
        self.known.remove(&addr);
        self.failed.remove(&addr);
        if self.self_aliases.insert(addr) {
            debug!(alias = %addr, "[qc-01] Recorded address of self");
        }
    }

    pub fn is_known(&self, addr: &PeerAddress) -> bool {
        self.known.contains(addr)
    }

    pub fn is_connected(&self, addr: &PeerAddress) -> bool {
        self.connected.contains_key(addr)
    }

    /// Whether `addr` is currently excluded by a failed attempt.
    pub fn is_failed(&self, addr: &PeerAddress, now: Instant) -> bool {
        match (self.failed.get(addr), self.policy) {
            (None, _) => false,
            (Some(_), FailedPeerPolicy::Permanent) => true,
            (Some(at), FailedPeerPolicy::RetryAfter(wait)) => now.duration_since(*at) < wait,
        }
    }

    /// Whether an outbound attempt to `addr` should be made.
    pub fn should_connect(&self, addr: &PeerAddress, now: Instant) -> bool {
        !self.is_self(addr) && !self.is_connected(addr) && !self.is_failed(addr, now)
    }

    /// Claim `addr` for an outbound attempt. Returns false if the attempt
    /// should not be made or another attempt is already in flight.
    pub fn begin_connect(&mut self, addr: PeerAddress, now: Instant) -> bool {
        if !self.should_connect(&addr, now) || self.known.contains(&addr) {
            return false;
        }
        self.known.insert(addr);
        true
    }

    /// Record a live connection. Clears any failed mark. Returns the handle
    /// it displaced, if any.
    pub fn register(&mut self, addr: PeerAddress, connection: C) -> Option<C> {
        self.known.insert(addr);
        self.failed.remove(&addr);
        let previous = self.connected.insert(addr, connection);
        debug!(peer = %addr, connected = self.connected.len(), "[qc-01] Peer registered");
        previous
    }

    /// Forget the connection to `addr`, but only if it is still the one
    /// identified by `connection_id`; a newer connection to the same address
    /// is left alone. Returns the removed handle.
    pub fn remove(&mut self, addr: &PeerAddress, connection_id: u64) -> Option<C> {
        match self.connected.get(addr) {
            Some(current) if current.connection_id() == connection_id => {
                let removed = self.connected.remove(addr);
                self.known.remove(addr);
                debug!(peer = %addr, connected = self.connected.len(), "[qc-01] Peer removed");
                removed
            }
            _ => None,
        }
    }

    /// Record a failed outbound attempt.
    pub fn mark_failed(&mut self, addr: PeerAddress, now: Instant) {
        if !self.connected.contains_key(&addr) {
            self.known.remove(&addr);
        }
        self.failed.insert(addr, now);
    }

    /// Drop failed marks the policy no longer honours.
    pub fn prune_expired_failures(&mut self, now: Instant) {
        if let FailedPeerPolicy::RetryAfter(wait) = self.policy {
            self.failed.retain(|_, at| now.duration_since(*at) < wait);
        }
    }

    /// Snapshot of live connections.
    pub fn connections(&self) -> Vec<(PeerAddress, C)> {
        self.connected
            .iter()
            .map(|(addr, conn)| (*addr, conn.clone()))
            .collect()
    }

    /// Live connection to `addr`.
    pub fn connection(&self, addr: &PeerAddress) -> Option<C> {
        self.connected.get(addr).cloned()
    }

    pub fn connected_count(&self) -> usize {
        self.connected.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Addresses in `host:ports` worth probing now: not self, not known and
    /// not excluded by a failure.
    pub fn scan_targets(
        &self,
        host: Ipv4Addr,
        ports: RangeInclusive<u16>,
        now: Instant,
    ) -> Vec<PeerAddress> {
        ports
            .map(|port| PeerAddress::new(host, port))
            .filter(|addr| !self.is_self(addr) && !self.is_known(addr) && !self.is_failed(addr, now))
            .collect()
    }

    /// Connected peers whose port lies in `ports`, for a PEER_LIST. Sorted,
    /// at most [`MAX_SHARED_PEERS`] entries.
    pub fn shareable_peers(&self, ports: RangeInclusive<u16>) -> Vec<PeerAddress> {
        let mut peers: Vec<PeerAddress> = self
            .connected
            .keys()
            .filter(|addr| ports.contains(&addr.port) && !self.is_self(addr))
            .copied()
            .collect();
        peers.sort();
        peers.truncate(MAX_SHARED_PEERS);
        peers
    }
}
