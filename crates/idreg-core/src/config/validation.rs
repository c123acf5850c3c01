//! Configuration validation utilities and rules

use super::traits::ConfigError;
use std::fmt;

/// Configuration validation result
pub type ValidationResult = Result<(), ValidationError>;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value is out of acceptable range
    OutOfRange {
        field: String,
        min: Option<u128>,
        max: Option<u128>,
        actual: u128,
    },
    /// Custom validation failed
    Custom { field: String, message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => {
                let range_desc = match (min, max) {
                    (Some(min), Some(max)) => format!("between {min} and {max}"),
                    (Some(min), None) => format!("at least {min}"),
                    (None, Some(max)) => format!("at most {max}"),
                    (None, None) => "in valid range".to_string(),
                };
                write!(f, "Field '{field}' must be {range_desc} (got {actual})")
            }
            ValidationError::Custom { field, message } => {
                write!(f, "Field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Configuration validator that accumulates validation rules
#[derive(Debug, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
    field_prefix: String,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator for a nested section
    pub fn for_section(section: &str) -> Self {
        Self {
            errors: Vec::new(),
            field_prefix: section.to_string(),
        }
    }

    /// Validate that a number is within an inclusive range
    pub fn range<T>(&mut self, field_name: &str, value: T, min: Option<T>, max: Option<T>) -> &mut Self
    where
        T: PartialOrd + Copy + Into<u128>,
    {
        let below = min.is_some_and(|min| value < min);
        let above = max.is_some_and(|max| value > max);
        if below || above {
            self.errors.push(ValidationError::OutOfRange {
                field: self.full_field_name(field_name),
                min: min.map(Into::into),
                max: max.map(Into::into),
                actual: value.into(),
            });
        }
        self
    }

    /// Validate that a number is strictly positive
    pub fn positive<T>(&mut self, field_name: &str, value: T) -> &mut Self
    where
        T: PartialOrd + Copy + Into<u128> + From<u8>,
    {
        self.range(field_name, value, Some(T::from(1u8)), None)
    }

    /// Validate using a custom predicate
    pub fn custom(&mut self, field_name: &str, holds: bool, message: &str) -> &mut Self {
        if !holds {
            self.errors.push(ValidationError::Custom {
                field: self.full_field_name(field_name),
                message: message.to_string(),
            });
        }
        self
    }

    /// Fold in errors from another validator
    pub fn absorb(&mut self, other: ConfigValidator) -> &mut Self {
        self.errors.extend(other.errors);
        self
    }

    /// Collected errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Finish validation
    pub fn finish(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self.errors))
        }
    }

    fn full_field_name(&self, field_name: &str) -> String {
        if self.field_prefix.is_empty() {
            field_name.to_string()
        } else {
            format!("{}.{}", self.field_prefix, field_name)
        }
    }
}
