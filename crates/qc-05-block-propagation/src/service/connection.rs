//! Per-connection tasks.
//!
//! Each TCP connection is split in two:
//!
//! - **reader**: reads frames and hands them to `P2PTransport::dispatch`
//! - **writer**: owns the write half, drains the outbound queue and sends the
//!   heartbeat
//!
//! Whichever side stops first tears the other down and removes the
//! connection from the peer table.

use super::{wait_for_shutdown, Frame, P2PTransport};
use crate::adapters::{read_frame, write_frame};
use crate::domain::WireMessage;
use qc_01_peer_discovery::PeerConnection;
use shared_types::PeerAddress;
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle stored in the peer table: a sender into the connection's writer.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    pub(super) id: u64,
    pub(super) peer: PeerAddress,
    /// Local end of the socket, for connections this node dialed.
    pub(super) source: Option<PeerAddress>,
    pub(super) outbound: mpsc::Sender<Frame>,
}

impl ConnectionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> PeerAddress {
        self.peer
    }
}

impl PeerConnection for ConnectionHandle {
    fn connection_id(&self) -> u64 {
        self.id
    }
}

impl P2PTransport {
    pub(super) async fn read_loop(self: Arc<Self>, mut reader: OwnedReadHalf, peer: PeerAddress, id: u64) {
        let mut shutdown = self.subscribe_shutdown();
        let mut first_frame = true;
        loop {
            let next = tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                next = read_frame(&mut reader, self.config.max_frame_size) => next,
            };
            match next {
                Ok(Some(raw)) => {
                    if let Err(err) = self.dispatch(&raw, peer).await {
                        if first_frame {
                            warn!(peer = %peer, error = %err, "[qc-05] Undecodable first frame, closing connection");
                            break;
                        }
                        debug!(peer = %peer, error = %err, "[qc-05] Dropping undecodable message");
                    }
                    first_frame = false;
                }
                Ok(None) => {
                    debug!(peer = %peer, "[qc-05] Peer closed the stream");
                    break;
                }
                Err(err) => {
                    debug!(peer = %peer, error = %err, "[qc-05] Read failed");
                    break;
                }
            }
        }
        self.drop_connection(peer, id);
    }

    pub(super) async fn write_loop(
        self: Arc<Self>,
        mut writer: OwnedWriteHalf,
        mut outbound: mpsc::Receiver<Frame>,
        peer: PeerAddress,
        id: u64,
        reader: AbortHandle,
    ) {
        let mut shutdown = self.subscribe_shutdown();
        let period = self.config.heartbeat_interval();
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut counter: u32 = 1;

        loop {
            let frame = tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => break,
                next = outbound.recv() => match next {
                    Some(frame) => frame,
                    None => break,
                },
                _ = heartbeat.tick() => {
                    let text = format!("Hello from {} - {}", self.local().port, counter);
                    let message = WireMessage::Text { counter, text };
                    counter = counter.wrapping_add(1);
                    match message.encode() {
                        Ok(bytes) => Arc::new(bytes),
                        Err(_) => continue,
                    }
                }
            };
            if let Err(err) = write_frame(&mut writer, &frame).await {
                debug!(peer = %peer, error = %err, "[qc-05] Write failed");
                break;
            }
        }

        reader.abort();
        self.drop_connection(peer, id);
    }
}
