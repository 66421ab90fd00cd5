//! # Block Propagation Subsystem (qc-05)
//!
//! Moves blocks and chains between nodes over TCP.
//!
//! ## Architecture Role
//!
//! ```text
//! [Ledger (8)] ←─ingest / replace─ [P2PTransport (5)] ←─frames─→ [Peer A]
//!                                         │                     [Peer B] ...
//!                                         └─ PeerTable (1): known / connected / failed
//! ```
//!
//! ## Layers
//!
//! - **domain**: `WireMessage` codec, `TransportConfig`, errors
//! - **adapters**: length-prefixed framing over tokio streams
//! - **service**: `P2PTransport` and the scan, discovery and sync tasks
//!
//! ## Delivery
//!
//! Gossip is best-effort. A peer whose outbound queue is full misses the
//! message; a peer whose connection closed is pruned on the next send.

pub mod adapters;
pub mod domain;
pub mod service;

pub use domain::*;
pub use service::{
    spawn_background_tasks, spawn_discovery_task, spawn_scan_task, spawn_sync_task,
    ConnectionHandle, Frame, P2PTransport,
};
