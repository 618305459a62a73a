//! Configuration for pricing engine

use crate::{installments::ScheduleOffsets, mdr::DEFAULT_MDR_RATE, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// MDR rate used when the fee table has no matching entry (percentage)
    pub default_mdr_rate: Decimal,

    /// Maximum installments accepted for a credit transaction
    pub max_installments: u32,

    /// Settlement offsets
    pub offsets: ScheduleOffsets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "pricing-engine".to_string(),
            default_mdr_rate: DEFAULT_MDR_RATE,
            max_installments: 12,
            offsets: ScheduleOffsets::default(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(rate) = std::env::var("PRICING_DEFAULT_MDR_RATE") {
            config.default_mdr_rate = rate
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("Invalid PRICING_DEFAULT_MDR_RATE: {}", e)))?;
        }

        if let Ok(max) = std::env::var("PRICING_MAX_INSTALLMENTS") {
            config.max_installments = max
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("Invalid PRICING_MAX_INSTALLMENTS: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scheduler cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.default_mdr_rate < Decimal::ZERO {
            return Err(Error::InvalidConfig(format!(
                "default_mdr_rate must be non-negative, got {}",
                self.default_mdr_rate
            )));
        }
        if self.max_installments < 1 {
            return Err(Error::InvalidConfig("max_installments must be at least 1".to_string()));
        }
        Ok(())
    }
}
