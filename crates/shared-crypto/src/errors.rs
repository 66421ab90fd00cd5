//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Input was not valid hex
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}
