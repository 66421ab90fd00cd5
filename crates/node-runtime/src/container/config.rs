//! # Node Configuration
//!
//! Unified configuration for the ledger, the transport and the runtime.
//!
//! ## Sources
//!
//! 1. Built-in defaults
//! 2. Optional TOML file named by `QC_CONFIG`
//! 3. Environment overrides: `QC_P2P_HOST`, `QC_P2P_PORT`, `QC_VALIDATOR_ID`,
//!    `QC_LOG_LEVEL`
//!
//! ## Config File Format
//!
//! ```toml
//! [network.transport]
//! port = 8761
//!
//! [network.discovery]
//! probe_port_end = 8765
//!
//! [ledger]
//! validators = ["validator_001", "validator_002"]
//! pool_capacity = 100
//!
//! [mining]
//! validator_id = "validator_001"
//! interval_secs = 10
//!
//! [logging]
//! level = "info"
//! ```

use qc_01_peer_discovery::DiscoveryConfig;
use qc_05_block_propagation::TransportConfig;
use qc_08_consensus::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Env var naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "QC_CONFIG";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Listener and peer discovery.
    pub network: NetworkConfig,
    /// Validator set and pool capacity.
    pub ledger: LedgerConfig,
    /// Local block production.
    pub mining: MiningConfig,
    /// Log filter fallback.
    pub logging: LoggingConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Network configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub transport: TransportConfig,
    pub discovery: DiscoveryConfig,
}

/// Mining/Block Production configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Identity used to seal blocks. No local mining when absent.
    pub validator_id: Option<String>,
    /// Seconds between mining attempts.
    pub interval_secs: u64,
}

impl MiningConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            validator_id: None,
            interval_secs: 10,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `QC_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("QC_P2P_HOST") {
            self.network.transport.host = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "QC_P2P_HOST",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("QC_P2P_PORT") {
            self.network.transport.port = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "QC_P2P_PORT",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("QC_VALIDATOR_ID") {
            self.mining.validator_id = Some(value).filter(|id| !id.is_empty());
        }
        if let Some(value) = lookup("QC_LOG_LEVEL") {
            self.logging.level = value;
        }
        Ok(())
    }
}

/// Load configuration from `QC_CONFIG` (if set) and the environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => NodeConfig::from_file(Path::new(&path))?,
        None => NodeConfig::default(),
    };
    config.apply_overrides(|var| std::env::var(var).ok())?;
    Ok(config)
}
