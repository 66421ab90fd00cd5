//! # Transport Configuration

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_P2P_PORT: u16 = 8760;

/// Largest frame accepted from a peer (16 MiB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Listener, connection and gossip timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Listening host.
    pub host: Ipv4Addr,
    /// Listening port (0 picks a free port).
    pub port: u16,
    /// Seconds between heartbeat TEXT messages on each connection.
    pub heartbeat_interval_secs: u64,
    /// Seconds between BLOCKCHAIN_REQUEST broadcasts.
    pub sync_interval_secs: u64,
    /// Outbound connect timeout.
    pub connect_timeout_ms: u64,
    /// Frames buffered per connection before broadcasts to it are dropped.
    pub outbound_queue: usize,
    /// Largest frame read from a peer.
    pub max_frame_size: usize,
}

impl TransportConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST,
            port: DEFAULT_P2P_PORT,
            heartbeat_interval_secs: 3,
            sync_interval_secs: 60,
            connect_timeout_ms: 2_000,
            outbound_queue: 256,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}
