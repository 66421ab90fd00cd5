//! # qc-08-consensus
//!
//! Proof-of-Authority ledger for Quantum-Chain.
//!
//! ## Architecture
//!
//! A fixed allow-list of validators seals blocks from the pending pool.
//! There is no voting and no leader election: any listed validator may seal
//! on the current tip, and competing forks resolve by the longest valid
//! chain.
//!
//! ```text
//! submit ──→ [TransactionPool] ──drain──→ mine ──seal──→ ValidateBlock ──→ append
//!                   ↑                                         │
//!                   └──────────── restore on failure ─────────┘
//!
//! NEW_BLOCK ──→ ingest_block ──→ Duplicate | Appended | Rejected
//! BLOCKCHAIN_RESPONSE ──→ replace_if_better ──→ Replaced | Rejected
//! ```
//!
//! ### Validation
//!
//! A block is valid when
//! 1. its stored hash equals the SHA-256 of its canonical encoding,
//! 2. every transaction's signature verifies (genesis transactions carry
//!    none), and
//! 3. for index > 0, the reference chain holds a block at `index - 1` whose
//!    hash equals `prev_hash`.
//!
//! Gossiped blocks are not trusted: they get the same checks as locally
//! sealed ones.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qc_08_consensus::{Ledger, LedgerConfig};
//! use shared_crypto::Ed25519Scheme;
//!
//! let ledger = Arc::new(Ledger::new(Arc::new(Ed25519Scheme), LedgerConfig::default())?);
//! ledger.submit(tx)?;
//! let block = ledger.mine("validator_001")?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;
mod state;
pub mod validation;

// Re-export main types
pub use domain::{
    compute_hash, genesis_block, seal, signed_private_message, signed_public_message,
    signed_register, verify_transaction, ChainState, IngestOutcome, LedgerConfig, LedgerError,
    LedgerResult, ReplaceOutcome, ValidatorSet, DEFAULT_VALIDATORS,
};
pub use ports::{LedgerApi, SystemTimeSource, TimeSource};
pub use service::Ledger;
pub use validation::BlockValidator;
