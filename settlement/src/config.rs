//! Configuration for settlement and debt recovery

use crate::{Error, Result};
use ledger_core::Cents;
use serde::{Deserialize, Serialize};

/// Settlement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Debt recovery settings
    pub recovery: RecoveryConfig,
}

/// Debt recovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Collect debts from settlements
    pub enabled: bool,

    /// Smallest settlement amount (cents) considered for collection
    pub min_settlement_amount: Cents,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settlement".to_string(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_settlement_amount: 1,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(enabled) = std::env::var("SETTLEMENT_RECOVERY_ENABLED") {
            config.recovery.enabled = enabled
                .parse()
                .map_err(|e| Error::Config(format!("Invalid SETTLEMENT_RECOVERY_ENABLED: {}", e)))?;
        }

        if let Ok(min) = std::env::var("SETTLEMENT_MIN_AMOUNT") {
            config.recovery.min_settlement_amount = min
                .parse()
                .map_err(|e| Error::Config(format!("Invalid SETTLEMENT_MIN_AMOUNT: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Only positive settlements may fund a debt
    pub fn validate(&self) -> Result<()> {
        if self.recovery.min_settlement_amount < 1 {
            return Err(Error::Config(format!(
                "min_settlement_amount must be at least 1, got {}",
                self.recovery.min_settlement_amount
            )));
        }
        Ok(())
    }
}
