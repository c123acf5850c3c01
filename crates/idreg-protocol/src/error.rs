//! Composition errors

use idreg_core::config::ConfigError;
use idreg_core::{Categorized, ErrorCategory};
use idreg_fname::NameError;
use idreg_identity::{IdentityError, KeyError};
use idreg_oracle::OracleError;
use idreg_storage::StorageError;

/// Any failure of a composed call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Oracle failure
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// Storage rent failure
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Id registry failure
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Key registry failure
    #[error(transparent)]
    Key(#[from] KeyError),
    /// Name registry failure
    #[error(transparent)]
    Name(#[from] NameError),
    /// An event could not be serialized
    #[error("event serialization failed: {0}")]
    Serialization(String),
}

/// Protocol result type
pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Serialization(err.to_string())
    }
}

impl Categorized for ProtocolError {
    fn category(&self) -> ErrorCategory {
        match self {
            ProtocolError::Config(_) => ErrorCategory::InvalidInput,
            ProtocolError::Oracle(err) => err.category(),
            ProtocolError::Storage(err) => err.category(),
            ProtocolError::Identity(err) => err.category(),
            ProtocolError::Key(err) => err.category(),
            ProtocolError::Name(err) => err.category(),
            ProtocolError::Serialization(_) => ErrorCategory::Internal,
        }
    }
}
