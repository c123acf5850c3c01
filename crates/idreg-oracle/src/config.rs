//! Oracle configuration

use idreg_core::config::{parse_value, ConfigError, ConfigValidator};
use serde::{Deserialize, Serialize};

/// Oracle configuration.
///
/// Prices use 8 decimals (`$2000.00 == 200_000_000_000`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Seconds a cached price stays fresh before paid calls refresh it (default: 1 day)
    pub cache_duration: u64,
    /// Maximum age of a feed answer in seconds (default: 2 hours)
    pub max_age: u64,
    /// Seconds the liveness feed must report up after a restart (default: 1 hour)
    pub uptime_grace_period: u64,
    /// Lowest accepted answer (default: $100)
    pub min_answer: u128,
    /// Highest accepted answer (default: $10,000)
    pub max_answer: u128,
    /// Emergency fixed price; 0 disables the override
    pub fixed_eth_usd_price: u128,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            cache_duration: 24 * 60 * 60,
            max_age: 2 * 60 * 60,
            uptime_grace_period: 60 * 60,
            min_answer: 100 * 100_000_000,
            max_answer: 10_000 * 100_000_000,
            fixed_eth_usd_price: 0,
        }
    }
}

impl OracleConfig {
    /// Set one field from a string override
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let key = format!("oracle.{field}");
        match field {
            "cache_duration" => self.cache_duration = parse_value(&key, value)?,
            "max_age" => self.max_age = parse_value(&key, value)?,
            "uptime_grace_period" => self.uptime_grace_period = parse_value(&key, value)?,
            "min_answer" => self.min_answer = parse_value(&key, value)?,
            "max_answer" => self.max_answer = parse_value(&key, value)?,
            "fixed_eth_usd_price" => self.fixed_eth_usd_price = parse_value(&key, value)?,
            _ => return Err(ConfigError::UnknownKey { key }),
        }
        Ok(())
    }

    /// Validation rules for this section
    pub fn validator(&self) -> ConfigValidator {
        let mut v = ConfigValidator::for_section("oracle");
        v.positive("max_age", self.max_age)
            .positive("min_answer", self.min_answer)
            .custom(
                "max_answer",
                self.min_answer < self.max_answer,
                "must be greater than min_answer",
            )
            .custom(
                "fixed_eth_usd_price",
                self.fixed_eth_usd_price == 0
                    || (self.min_answer..=self.max_answer).contains(&self.fixed_eth_usd_price),
                "must be 0 or within [min_answer, max_answer]",
            );
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(OracleConfig::default().validator().finish().is_ok());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let config = OracleConfig {
            min_answer: 5,
            max_answer: 5,
            ..OracleConfig::default()
        };
        assert!(config.validator().finish().is_err());
    }

    #[test]
    fn set_field_parses_and_rejects_unknown() {
        let mut config = OracleConfig::default();
        config.set_field("max_age", "3_600").unwrap();
        assert_eq!(config.max_age, 3600);
        assert!(config.set_field("bogus", "1").is_err());
        assert!(config.set_field("max_age", "soon").is_err());
    }
}
