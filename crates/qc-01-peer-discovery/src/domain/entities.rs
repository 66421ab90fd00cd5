//! Core Domain Entities for Peer Discovery

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::time::Duration;

/// First port of the default probe range.
pub const DEFAULT_PROBE_PORT_START: u16 = 8760;

/// Last port of the default probe range.
pub const DEFAULT_PROBE_PORT_END: u16 = 8769;

/// A PEER_LIST carries at most this many entries (one-byte count).
pub const MAX_SHARED_PEERS: usize = 255;

/// How long an address that failed to connect stays excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedPeerPolicy {
    /// Never retried for the life of the process.
    Permanent,
    /// Eligible again once this much time has passed since the failure.
    RetryAfter(Duration),
}

impl FailedPeerPolicy {
    /// Maps `failed_retry_after_secs`: absent means permanent.
    pub fn from_secs(secs: Option<u64>) -> Self {
        match secs {
            Some(secs) => Self::RetryAfter(Duration::from_secs(secs)),
            None => Self::Permanent,
        }
    }
}

/// Scan and discovery configuration.
///
/// # Config File Format
///
/// ```toml
/// probe_host = "127.0.0.1"
/// probe_port_start = 8760
/// probe_port_end = 8769
/// scan_interval_secs = 10
/// discovery_interval_secs = 5
/// # failed_retry_after_secs = 300
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Host probed by the scanner.
    pub probe_host: Ipv4Addr,
    /// First port probed by the scanner.
    pub probe_port_start: u16,
    /// Last port probed by the scanner (inclusive).
    pub probe_port_end: u16,
    /// Ports that may appear in a shared PEER_LIST. Defaults to the probe
    /// range; accepted connections arrive from ephemeral ports that are not
    /// listening and must not be advertised.
    pub shareable_port_start: Option<u16>,
    pub shareable_port_end: Option<u16>,
    /// Seconds between scans (at least 1).
    pub scan_interval_secs: u64,
    /// Seconds between PEER_LIST broadcasts.
    pub discovery_interval_secs: u64,
    /// Seconds before a failed address may be retried. `None` = never.
    pub failed_retry_after_secs: Option<u64>,
}

impl DiscoveryConfig {
    /// Ports probed by the scanner.
    pub fn probe_ports(&self) -> RangeInclusive<u16> {
        self.probe_port_start..=self.probe_port_end
    }

    /// Ports eligible for PEER_LIST sharing.
    pub fn shareable_ports(&self) -> RangeInclusive<u16> {
        self.shareable_port_start.unwrap_or(self.probe_port_start)
            ..=self.shareable_port_end.unwrap_or(self.probe_port_end)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_interval_secs.max(1))
    }

    pub fn failed_policy(&self) -> FailedPeerPolicy {
        FailedPeerPolicy::from_secs(self.failed_retry_after_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_host: Ipv4Addr::LOCALHOST,
            probe_port_start: DEFAULT_PROBE_PORT_START,
            probe_port_end: DEFAULT_PROBE_PORT_END,
            shareable_port_start: None,
            shareable_port_end: None,
            scan_interval_secs: 10,
            discovery_interval_secs: 5,
            failed_retry_after_secs: None,
        }
    }
}
