//! Unified configuration
//!
//! One TOML document with a table per registry:
//!
//! ```toml
//! [oracle]
//! cache_duration = 86400
//!
//! [storage]
//! max_units = 2000000
//!
//! [names]
//! fee = 10000000000000000
//! ```
//!
//! Environment overrides use `IDREG_<SECTION>__<FIELD>`.

use idreg_core::config::{ConfigError, ConfigValidator, RegistryConfig};
use idreg_fname::NameConfig;
use idreg_identity::{IdentityConfig, KeyRegistryConfig};
use idreg_oracle::OracleConfig;
use idreg_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Configuration of every registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Price oracle
    pub oracle: OracleConfig,
    /// Storage rent
    pub storage: StorageConfig,
    /// Id registry
    pub identity: IdentityConfig,
    /// Key registry
    pub keys: KeyRegistryConfig,
    /// Name registry
    pub names: NameConfig,
}

impl RegistryConfig for ProtocolConfig {
    fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let (section, field) = key.split_once('.').ok_or_else(|| ConfigError::UnknownKey {
            key: key.to_string(),
        })?;
        match section {
            "oracle" => self.oracle.set_field(field, value),
            "storage" => self.storage.set_field(field, value),
            "identity" => self.identity.set_field(field, value),
            "keys" => self.keys.set_field(field, value),
            "names" => self.names.set_field(field, value),
            _ => Err(ConfigError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut v = ConfigValidator::new();
        v.absorb(self.oracle.validator())
            .absorb(self.storage.validator())
            .absorb(self.identity.validator())
            .absorb(self.keys.validator())
            .absorb(self.names.validator());

        let mut cross = ConfigValidator::for_section("storage");
        cross.custom(
            "deprecation_period",
            self.storage.deprecation_period > self.oracle.cache_duration,
            "must exceed oracle.cache_duration",
        );
        v.absorb(cross);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_keys_reach_sections() {
        let mut config = ProtocolConfig::default();
        config.set_from_string("storage.max_units", "10").unwrap();
        config.set_from_string("names.reveal_delay", "120").unwrap();
        assert_eq!(config.storage.max_units, 10);
        assert_eq!(config.names.reveal_delay, 120);
        assert!(config.set_from_string("nothing", "1").is_err());
        assert!(config.set_from_string("ledger.size", "1").is_err());
    }

    #[test]
    fn cross_section_rule() {
        let mut config = ProtocolConfig::default();
        assert!(config.validate().is_ok());
        config.storage.deprecation_period = config.oracle.cache_duration;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(errors)) if errors.len() == 1));
    }
}
