//! # Transaction Pool (Mempool) Subsystem
//!
//! **Subsystem ID:** 6
//!
//! ## Purpose
//!
//! Holds submitted transactions until a validator seals them into a block.
//! Admission does not validate signatures; the ledger checks every
//! transaction when the block is validated.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Size never exceeds capacity on submit | `domain/pool.rs` - `submit()` |
//! | Insertion order preserved | `domain/pool.rs` - `VecDeque` |
//! | Drain is all-or-nothing | `domain/pool.rs` - `drain()` |
//! | Restored batch keeps its order, ahead of newer submissions | `domain/pool.rs` - `restore()` |
//!
//! ## Drain / Restore
//!
//! ```text
//! [PENDING] ──drain──→ [SEALING] ──block appended──→ (consumed)
//!                          │
//!                          └── block rejected ──restore──→ [PENDING] (front)
//! ```
//!
//! The pool itself is not synchronized; the ledger owns it behind a mutex.

pub mod domain;

pub use domain::*;
