//! Error categories and the leaf errors shared by every registry
//!
//! Each registry crate owns a typed error enum with one variant per failure
//! cause. The enums all implement [`Categorized`] so callers can tell an
//! authorization problem from a timing problem or a broken upstream feed
//! without matching on every variant.

use crate::access::Role;
use crate::types::{Address, Wei};
use serde::{Deserialize, Serialize};

/// Coarse failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caller is not the required address or lacks a role
    Authorization,
    /// Object exists / does not exist / wrong lifecycle phase
    StatePrecondition,
    /// Escrow, reveal delay, replay window or deadline not satisfied
    Timing,
    /// Attached value does not cover the quoted price
    Payment,
    /// Upstream feed down, stale or out of bounds; value transfer failed
    ExternalDependency,
    /// Malformed arguments
    InvalidInput,
    /// Arithmetic overflow or other internal fault
    Internal,
}

/// Classification hook implemented by every registry error.
pub trait Categorized {
    /// Category of this failure
    fn category(&self) -> ErrorCategory;
}

/// Signed-authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SignatureError {
    /// Signature does not verify for the expected signer
    #[error("invalid signature for {signer}")]
    InvalidSignature {
        /// Expected signer
        signer: Address,
    },
    /// Deadline has passed
    #[error("signature expired at {deadline}")]
    SignatureExpired {
        /// Signature deadline (seconds)
        deadline: u64,
    },
}

impl Categorized for SignatureError {
    fn category(&self) -> ErrorCategory {
        match self {
            SignatureError::InvalidSignature { .. } => ErrorCategory::Authorization,
            SignatureError::SignatureExpired { .. } => ErrorCategory::Timing,
        }
    }
}

/// Privileged-role failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AccessError {
    /// Subject does not hold the role
    #[error("{subject} lacks role {role:?}")]
    MissingRole {
        /// Address that attempted the call
        subject: Address,
        /// Required role
        role: Role,
    },
}

impl Categorized for AccessError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Authorization
    }
}

/// Native value transfer failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TransferError {
    /// Recipient rejected the transfer or the send failed
    #[error("call failed sending {amount} wei to {to}")]
    CallFailed {
        /// Recipient
        to: Address,
        /// Amount in wei
        amount: Wei,
    },
}

impl Categorized for TransferError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::ExternalDependency
    }
}

/// Checked arithmetic failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// Arithmetic overflowed
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },
    /// Division by zero
    #[error("division by zero in {operation}")]
    DivisionByZero {
        /// Operation that divided by zero
        operation: String,
    },
}

impl LedgerError {
    /// Create an overflow error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create a division-by-zero error
    pub fn division_by_zero(operation: impl Into<String>) -> Self {
        Self::DivisionByZero {
            operation: operation.into(),
        }
    }
}

impl Categorized for LedgerError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::Internal
    }
}
