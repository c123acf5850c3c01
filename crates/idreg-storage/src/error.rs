//! Storage errors

use idreg_core::{
    AccessError, Categorized, ErrorCategory, LedgerError, Timestamp, TransferError, Wei,
};
use idreg_oracle::OracleError;
use serde::{Deserialize, Serialize};

/// Storage rent failure causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StorageError {
    /// Paid rent has stopped
    #[error("storage rent deprecated since {deprecated_at}")]
    ContractDeprecated {
        /// Deprecation timestamp
        deprecated_at: Timestamp,
    },
    /// Zero units requested
    #[error("unit amount must be positive")]
    InvalidAmount,
    /// Request would exceed capacity
    #[error("{requested} units requested but only {available} available")]
    ExceedsCapacity {
        /// Units requested
        requested: u64,
        /// Units left
        available: u64,
    },
    /// Attached value below the price
    #[error("payment of {provided} wei below price {required}")]
    InvalidPayment {
        /// Price in wei
        required: Wei,
        /// Value attached
        provided: Wei,
    },
    /// Batch arrays are empty or of different lengths
    #[error("batch input must be non-empty parallel arrays")]
    InvalidBatchInput,
    /// Fid range ends before it starts
    #[error("invalid fid range {start}..={end}")]
    InvalidRangeInput {
        /// First fid
        start: u64,
        /// Last fid
        end: u64,
    },
    /// Deprecation moved into the past
    #[error("deprecation timestamp {timestamp} is before now ({now})")]
    InvalidDeprecationTimestamp {
        /// Rejected timestamp
        timestamp: Timestamp,
        /// Current time
        now: Timestamp,
    },
    /// Zero address supplied
    #[error("address must be non-zero")]
    InvalidAddress,
    /// Withdrawal above the held balance
    #[error("withdrawal of {requested} wei exceeds balance {balance}")]
    InsufficientFunds {
        /// Amount requested
        requested: Wei,
        /// Balance held
        balance: Wei,
    },
    /// Caller lacks a required role
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Price could not be determined
    #[error(transparent)]
    Oracle(#[from] OracleError),
    /// Refund or withdrawal send failed
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// Checked arithmetic failed
    #[error(transparent)]
    Math(#[from] LedgerError),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

impl Categorized for StorageError {
    fn category(&self) -> ErrorCategory {
        match self {
            StorageError::ContractDeprecated { .. } => ErrorCategory::StatePrecondition,
            StorageError::ExceedsCapacity { .. } => ErrorCategory::StatePrecondition,
            StorageError::InvalidPayment { .. } | StorageError::InsufficientFunds { .. } => {
                ErrorCategory::Payment
            }
            StorageError::InvalidAmount
            | StorageError::InvalidBatchInput
            | StorageError::InvalidRangeInput { .. }
            | StorageError::InvalidDeprecationTimestamp { .. }
            | StorageError::InvalidAddress => ErrorCategory::InvalidInput,
            StorageError::Access(err) => err.category(),
            StorageError::Oracle(err) => err.category(),
            StorageError::Transfer(err) => err.category(),
            StorageError::Math(err) => err.category(),
        }
    }
}
