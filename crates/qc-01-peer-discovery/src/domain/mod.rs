//! # Domain Layer
//!
//! - `entities`: discovery configuration and failed-peer policy
//! - `peer_table`: known/connected/failed tables and scan/share selection

pub mod entities;
pub mod peer_table;

pub use entities::*;
pub use peer_table::*;
