//! Error types for the wire protocol and the TCP transport.

use super::wire::MessageType;
use shared_types::PeerAddress;
use thiserror::Error;

/// Encoding or decoding failure of a single message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("Empty message")]
    Empty,

    #[error("Unknown message type: 0x{0:02x}")]
    UnknownType(u8),

    #[error("Malformed {kind:?} payload: {reason}")]
    Malformed { kind: MessageType, reason: String },

    #[error("Invalid JSON payload: {0}")]
    Json(String),

    #[error("Peer list of {0} entries exceeds 255")]
    TooManyPeers(usize),
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Failure reading or writing one length-prefixed frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame of {size} bytes exceeds limit of {max}")]
    TooLarge { size: usize, max: usize },

    #[error("Stream closed after {received} of 4 length-prefix bytes")]
    TruncatedHeader { received: usize },
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Connection to {addr} failed: {reason}")]
    ConnectionFailure { addr: PeerAddress, reason: String },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),
}
