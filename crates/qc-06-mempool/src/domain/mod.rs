//! # Domain Layer - Mempool Subsystem
//!
//! ## Components
//!
//! - `entities`: MempoolConfig
//! - `pool`: bounded, insertion-ordered TransactionPool
//! - `errors`: MempoolError enumeration

pub mod entities;
pub mod errors;
pub mod pool;

pub use entities::*;
pub use errors::*;
pub use pool::*;
