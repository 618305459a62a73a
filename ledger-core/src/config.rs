//! Configuration for the payables ledger

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Offset of the business timezone from UTC, in minutes.
    /// Calendar days (same-day refunds, "today") are evaluated in this zone.
    pub business_utc_offset_minutes: i32,

    /// Chargeback policy used when the caller does not name one
    pub default_chargeback_policy: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "ledger-core".to_string(),
            business_utc_offset_minutes: 0,
            default_chargeback_policy: crate::chargeback::PROPORTIONAL_TO_SPLIT.to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.business_offset()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(offset) = std::env::var("LEDGER_BUSINESS_UTC_OFFSET_MINUTES") {
            config.business_utc_offset_minutes = offset.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_BUSINESS_UTC_OFFSET_MINUTES: {}", e))
            })?;
        }

        if let Ok(policy) = std::env::var("LEDGER_CHARGEBACK_POLICY") {
            config.default_chargeback_policy = policy;
        }

        config.business_offset()?;
        Ok(config)
    }

    /// Business timezone as a fixed offset
    pub fn business_offset(&self) -> crate::Result<FixedOffset> {
        FixedOffset::east_opt(self.business_utc_offset_minutes * 60).ok_or_else(|| {
            crate::Error::Config(format!(
                "UTC offset out of range: {} minutes",
                self.business_utc_offset_minutes
            ))
        })
    }
}
