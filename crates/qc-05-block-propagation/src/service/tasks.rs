//! Background tasks driven by the transport.
//!
//! | Task | Period | Action |
//! |------|--------|--------|
//! | scan | `scan_interval` (first run immediately) | `scan_for_peers` |
//! | discovery | `discovery_interval` | `share_peers` |
//! | sync | `sync_interval` | `request_sync` |
//!
//! Every task exits when the transport shuts down.

use super::{wait_for_shutdown, P2PTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

fn spawn_periodic<F>(
    transport: Arc<P2PTransport>,
    name: &'static str,
    start: Instant,
    period: Duration,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut(&Arc<P2PTransport>) + Send + 'static,
{
    tokio::spawn(async move {
        let mut shutdown = transport.subscribe_shutdown();
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = ticker.tick() => tick(&transport),
            }
        }
        debug!(task = name, "[qc-05] Background task stopped");
    })
}

/// Probe the configured port range for listening peers.
pub fn spawn_scan_task(transport: Arc<P2PTransport>) -> JoinHandle<()> {
    let period = transport.discovery().scan_interval();
    spawn_periodic(transport, "scan", Instant::now(), period, |transport| {
        transport.scan_for_peers();
    })
}

/// Advertise connected peers.
pub fn spawn_discovery_task(transport: Arc<P2PTransport>) -> JoinHandle<()> {
    let period = transport.discovery().discovery_interval();
    spawn_periodic(transport, "discovery", Instant::now() + period, period, |transport| {
        if let Err(err) = transport.share_peers() {
            warn!(error = %err, "[qc-05] Failed to encode peer list");
        }
    })
}

/// Ask every peer for its chain.
pub fn spawn_sync_task(transport: Arc<P2PTransport>) -> JoinHandle<()> {
    let period = transport.config().sync_interval();
    spawn_periodic(transport, "sync", Instant::now() + period, period, |transport| {
        match transport.request_sync() {
            Ok(sent) => debug!(peers = sent, "[qc-05] Periodic chain sync requested"),
            Err(err) => warn!(error = %err, "[qc-05] Failed to encode sync request"),
        }
    })
}

/// Scan, discovery and sync tasks together.
pub fn spawn_background_tasks(transport: &Arc<P2PTransport>) -> Vec<JoinHandle<()>> {
    vec![
        spawn_scan_task(Arc::clone(transport)),
        spawn_discovery_task(Arc::clone(transport)),
        spawn_sync_task(Arc::clone(transport)),
    ]
}
