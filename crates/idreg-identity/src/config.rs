//! Registry configuration

use idreg_core::config::{parse_value, ConfigError, ConfigValidator};
use idreg_recovery::ESCROW_PERIOD;
use serde::{Deserialize, Serialize};

/// Id registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Signing domain name
    pub domain_name: String,
    /// Signing domain version
    pub domain_version: String,
    /// Chain id bound into signatures
    pub chain_id: u64,
    /// Seconds an escrowed recovery waits (default: 3 days)
    pub escrow_period: u64,
    /// Start with registration paused
    pub start_paused: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            domain_name: "idreg IdRegistry".to_string(),
            domain_version: "1".to_string(),
            chain_id: 10,
            escrow_period: ESCROW_PERIOD,
            start_paused: false,
        }
    }
}

impl IdentityConfig {
    /// Set one field from a string override
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let key = format!("identity.{field}");
        match field {
            "domain_name" => self.domain_name = value.to_string(),
            "domain_version" => self.domain_version = value.to_string(),
            "chain_id" => self.chain_id = parse_value(&key, value)?,
            "escrow_period" => self.escrow_period = parse_value(&key, value)?,
            "start_paused" => self.start_paused = parse_value(&key, value)?,
            _ => return Err(ConfigError::UnknownKey { key }),
        }
        Ok(())
    }

    /// Validation rules for this section
    pub fn validator(&self) -> ConfigValidator {
        let mut v = ConfigValidator::for_section("identity");
        v.custom("domain_name", !self.domain_name.is_empty(), "must not be empty")
            .positive("chain_id", self.chain_id)
            .positive("escrow_period", self.escrow_period);
        v
    }
}

/// Key registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRegistryConfig {
    /// Most keys an fid may hold in the `Added` state (default: 1000)
    pub max_keys_per_fid: u32,
}

impl Default for KeyRegistryConfig {
    fn default() -> Self {
        Self {
            max_keys_per_fid: 1000,
        }
    }
}

impl KeyRegistryConfig {
    /// Set one field from a string override
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        let key = format!("keys.{field}");
        match field {
            "max_keys_per_fid" => self.max_keys_per_fid = parse_value(&key, value)?,
            _ => return Err(ConfigError::UnknownKey { key }),
        }
        Ok(())
    }

    /// Validation rules for this section
    pub fn validator(&self) -> ConfigValidator {
        let mut v = ConfigValidator::for_section("keys");
        v.positive("max_keys_per_fid", self.max_keys_per_fid);
        v
    }
}
