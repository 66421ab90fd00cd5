//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces this subsystem **requires** the host application to implement.

/// Handle to a live connection stored in the peer table.
///
/// The transport decides what a handle is (typically a sender into the
/// connection's writer task). The table only needs to clone it and tell two
/// connections to the same address apart.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the table can be shared by the
/// accept loop, reader tasks and background tasks.
pub trait PeerConnection: Clone + Send + Sync {
    /// Process-unique identifier of this connection.
    fn connection_id(&self) -> u64;
}
