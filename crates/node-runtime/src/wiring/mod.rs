//! # Subsystem Wiring
//!
//! Tasks that connect the ledger to the transport beyond message dispatch.
//!
//! ```text
//! [Mining task] ──mine──→ [Ledger (8)]
//!       │
//!       └──announce_block──→ [P2PTransport (5)] ──NEW_BLOCK──→ peers
//! ```

mod mining;

pub use mining::{mine_once, spawn_mining_task, MiningTick};
