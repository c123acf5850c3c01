//! Storage configuration

use idreg_core::config::{parse_value, ConfigError, ConfigValidator};
use serde::{Deserialize, Serialize};

/// Storage rent parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// USD price of one unit, 8 decimals (default: $5)
    pub usd_unit_price: u128,
    /// Capacity in units (default: 2,000,000)
    pub max_units: u64,
    /// Seconds after genesis at which paid rent stops (default: 1 year)
    pub deprecation_period: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            usd_unit_price: 5 * 100_000_000,
            max_units: 2_000_000,
            deprecation_period: 365 * 24 * 60 * 60,
        }
    }
}

impl StorageConfig {
    /// Set one field from a string override
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let key = format!("storage.{field}");
        match field {
            "usd_unit_price" => self.usd_unit_price = parse_value(&key, value)?,
            "max_units" => self.max_units = parse_value(&key, value)?,
            "deprecation_period" => self.deprecation_period = parse_value(&key, value)?,
            _ => return Err(ConfigError::UnknownKey { key }),
        }
        Ok(())
    }

    /// Validation rules for this section
    pub fn validator(&self) -> ConfigValidator {
        let mut v = ConfigValidator::for_section("storage");
        v.positive("usd_unit_price", self.usd_unit_price)
            .positive("deprecation_period", self.deprecation_period);
        v
    }
}
