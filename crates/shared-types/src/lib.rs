//! # Shared Types Crate
//!
//! This crate contains the ledger entities exchanged between subsystems and
//! carried on the wire.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The gossip path and the ledger use the same
//!   `Block` and `Transaction` shapes. There is no second "light" block.
//! - **Validated Construction**: A `Transaction` is a sum type with one
//!   payload struct per kind. Missing required fields are rejected when the
//!   transaction is built or decoded, never re-checked at call sites.
//! - **Canonical Encoding**: `codec` produces the byte string fed to the
//!   digest function (sorted keys, no whitespace).

pub mod codec;
pub mod entities;
pub mod errors;

pub use codec::canonical_json;
pub use entities::*;
pub use errors::*;
