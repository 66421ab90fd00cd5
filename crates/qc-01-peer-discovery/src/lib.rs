//! # Peer Discovery Subsystem
//!
//! **Subsystem ID:** 1
//!
//! Decides which peers a node talks to. The transport (Subsystem 5) owns the
//! sockets; this crate owns the bookkeeping:
//!
//! - which addresses are known, connected, or failed (`PeerTable`)
//! - which addresses the scanner probes (`PeerTable::scan_targets`)
//! - which peers are advertised in a PEER_LIST (`PeerTable::shareable_peers`)
//! - whether a failed address is ever retried (`FailedPeerPolicy`)
//!
//! ## Architecture
//!
//! - **Domain Layer:** peer tables and selection rules, no I/O
//! - **Ports Layer:** `PeerConnection`, the handle type the transport stores
//!
//! ## Example
//!
//! ```rust
//! use qc_01_peer_discovery::{FailedPeerPolicy, PeerConnection, PeerTable};
//! use shared_types::PeerAddress;
//! use std::net::Ipv4Addr;
//! use std::time::Instant;
//!
//! #[derive(Clone)]
//! struct Handle(u64);
//! impl PeerConnection for Handle {
//!     fn connection_id(&self) -> u64 { self.0 }
//! }
//!
//! let local = PeerAddress::new(Ipv4Addr::LOCALHOST, 8760);
//! let mut table = PeerTable::<Handle>::new(local, FailedPeerPolicy::Permanent);
//!
//! let targets = table.scan_targets(Ipv4Addr::LOCALHOST, 8760..=8769, Instant::now());
//! assert_eq!(targets.len(), 9);
//!
//! table.register(PeerAddress::new(Ipv4Addr::LOCALHOST, 8761), Handle(1));
//! assert_eq!(table.shareable_peers(8760..=8769).len(), 1);
//! ```

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::*;
