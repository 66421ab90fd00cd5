//! # Integration Scenarios
//!
//! Real nodes (ledger + transport) talking over 127.0.0.1.
//!
//! - `sync`: a fresh node adopts a longer chain on connect
//! - `gossip`: NEW_BLOCK relay and idempotency across three nodes
//! - `runtime`: fully wired nodes producing blocks through the mining path

#[cfg(test)]
pub mod harness;

mod gossip;
mod runtime;
mod sync;
