//! Recovery errors

use idreg_core::{Address, Categorized, ErrorCategory, Timestamp};
use serde::{Deserialize, Serialize};

/// Recovery failure causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RecoveryError {
    /// Caller is not the recovery address
    #[error("{caller} is not the recovery address")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },
    /// No request pending
    #[error("no recovery pending")]
    NoRecovery,
    /// Escrow period not over
    #[error("recovery escrowed until {ready_at}")]
    Escrow {
        /// First timestamp at which the request can complete
        ready_at: Timestamp,
    },
    /// Destination is the zero address
    #[error("recovery destination must be non-zero")]
    InvalidDestination,
}

/// Recovery result type
pub type RecoveryResult<T> = Result<T, RecoveryError>;

impl Categorized for RecoveryError {
    fn category(&self) -> ErrorCategory {
        match self {
            RecoveryError::Unauthorized { .. } => ErrorCategory::Authorization,
            RecoveryError::NoRecovery => ErrorCategory::StatePrecondition,
            RecoveryError::Escrow { .. } => ErrorCategory::Timing,
            RecoveryError::InvalidDestination => ErrorCategory::InvalidInput,
        }
    }
}
