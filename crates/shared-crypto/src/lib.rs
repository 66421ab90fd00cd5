//! # Shared Crypto - Signature and Digest Primitives
//!
//! The ledger treats signing and hashing as pluggable capabilities with a
//! fixed call contract. This crate provides that contract and its default
//! backends.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Block digests, message hashes |
//! | `signatures` | Ed25519 | Transaction signatures |
//!
//! ## Contract
//!
//! - `digest(bytes)` returns lowercase hex.
//! - `SignatureScheme::verify` never panics: malformed keys or signatures
//!   verify as `false`.
//! - Keys and signatures travel as lowercase hex strings.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{digest, sha256};
pub use signatures::{Ed25519Scheme, KeyPair, SecretKey, SignatureScheme};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
