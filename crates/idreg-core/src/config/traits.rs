//! Core configuration traits for registry configuration sections

use super::validation::ValidationError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Configuration loading and validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file {path}: {reason}")]
    Read {
        /// Path that failed
        path: String,
        /// Underlying error
        reason: String,
    },
    /// File contents did not parse
    #[error("invalid config: {reason}")]
    Parse {
        /// Underlying error
        reason: String,
    },
    /// A key=value override named an unknown field
    #[error("unknown config key '{key}'")]
    UnknownKey {
        /// The offending key
        key: String,
    },
    /// A key=value override carried a malformed value
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue {
        /// The key being set
        key: String,
        /// The value that failed to parse
        value: String,
    },
    /// One or more validation rules failed
    #[error("configuration invalid: {}", render(.0))]
    Invalid(Vec<ValidationError>),
}

fn render(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Core trait for registry configuration sections.
pub trait RegistryConfig: Clone + Default + DeserializeOwned + Send + Sync + 'static {
    /// Prefix for environment overrides, e.g. `IDREG_`
    const ENV_PREFIX: &'static str = "IDREG_";

    /// Parse TOML text
    fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Load from a TOML file
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Set a field from a dotted key (`section.field`) and string value
    fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Apply every `ENV_PREFIX`-prefixed environment variable.
    ///
    /// `IDREG_STORAGE__MAX_UNITS=10` maps to key `storage.max_units`.
    fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        let overrides: Vec<(String, String)> = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(Self::ENV_PREFIX)
                    .map(|rest| (rest.to_lowercase().replace("__", "."), value))
            })
            .collect();
        self.merge_overrides(overrides)
    }

    /// Apply explicit `(key, value)` overrides
    fn merge_overrides<I>(&mut self, overrides: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in overrides {
            self.set_from_string(&key, &value)?;
        }
        Ok(())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Parse a numeric override value
pub fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .replace('_', "")
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}
