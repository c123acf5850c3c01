//! Configuration traits and validation

/// Core configuration traits
pub mod traits;
/// Accumulating validation rules
pub mod validation;

pub use traits::{parse_value, ConfigError, RegistryConfig};
pub use validation::{ConfigValidator, ValidationError, ValidationResult};
