//! # Subsystem Container
//!
//! Configuration plus the subsystem instances built from it.

pub mod config;
pub mod subsystems;

pub use config::{load_config, ConfigError, NodeConfig};
pub use subsystems::{NodeLedger, SubsystemContainer};
