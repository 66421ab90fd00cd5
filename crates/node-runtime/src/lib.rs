//! # Node Runtime Library
//!
//! Exposes the runtime's configuration, subsystem container and wiring for
//! the binary and the integration tests. The entry point is `main.rs`.
//!
//! ## Modules
//!
//! - `container/`: `NodeConfig` loading and the `SubsystemContainer`
//! - `wiring/`: the local mining task

pub mod container;
pub mod wiring;

pub use container::{load_config, ConfigError, NodeConfig, NodeLedger, SubsystemContainer};
pub use wiring::{mine_once, spawn_mining_task, MiningTick};
