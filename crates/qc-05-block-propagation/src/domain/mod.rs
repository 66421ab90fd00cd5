//! # Domain Layer for Block Propagation
//!
//! Pure message and configuration types with no I/O.
//!
//! ## Contents
//!
//! - **wire**: `MessageType`, `WireMessage` encode/decode
//! - **entities**: `TransportConfig`
//! - **errors**: `WireError`, `TransportError`

mod entities;
mod errors;
mod wire;

pub use entities::*;
pub use errors::*;
pub use wire::*;
