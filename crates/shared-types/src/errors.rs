//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while building or decoding a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A payload key required by the transaction kind is absent.
    #[error("Missing field '{field}' for {kind} transaction")]
    MissingField { kind: String, field: String },

    /// The `tx_type` tag is not one of the known kinds.
    #[error("Unknown transaction type: {0}")]
    UnknownKind(String),
}

/// Errors raised while producing the canonical encoding of an entity.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The entity could not be converted into a JSON value.
    #[error("Serialization failed: {0}")]
    Serialize(String),
}
