//! Domain layer for the ledger
//!
//! - block: hashing and sealing, the genesis block
//! - chain: the local chain
//! - fork_choice: longest-valid-chain rule and outcome types
//! - transactions: signed transaction builders and per-transaction checks
//! - validator: the static PoA allow-list

mod block;
mod chain;
mod config;
mod error;
mod fork_choice;
mod transactions;
mod validator;

pub use block::*;
pub use chain::*;
pub use config::*;
pub use error::*;
pub use fork_choice::*;
pub use transactions::*;
pub use validator::*;
