//! Name errors

use idreg_core::{
    AccessError, Address, Categorized, ErrorCategory, LedgerError, Timestamp, TransferError, Wei,
};
use idreg_recovery::RecoveryError;
use serde::{Deserialize, Serialize};

/// Name registry failure causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum NameError {
    /// Name violates the charset or length rules
    #[error("invalid name")]
    InvalidName,
    /// Only trusted registration is open
    #[error("registration is invite-only")]
    Invitable,
    /// Trusted registration has been disabled
    #[error("trusted registration is disabled")]
    NotInvitable,
    /// The same commit was made too recently
    #[error("commit can be repeated at {ready_at}")]
    CommitReplay {
        /// First timestamp the commit may be made again
        ready_at: Timestamp,
    },
    /// No matching commit, or the reveal delay has not passed
    #[error("no revealable commit")]
    InvalidCommit,
    /// Attached value below the price
    #[error("payment of {provided} wei below price {required}")]
    InsufficientFunds {
        /// Price in wei
        required: Wei,
        /// Value attached
        provided: Wei,
    },
    /// Name has never been minted
    #[error("name has never been registered")]
    Registrable,
    /// Name lease is still running
    #[error("name is registered")]
    Registered,
    /// Name was minted before and can only be bid on
    #[error("name was registered before and can only be bid on")]
    NotRegistrable,
    /// Grace period is over
    #[error("renewal window closed")]
    NotRenewable,
    /// Auction has not started
    #[error("name is not in auction")]
    NotBiddable,
    /// Name lease has lapsed
    #[error("name expired at {expiry}")]
    Expired {
        /// Expiry timestamp
        expiry: Timestamp,
    },
    /// Timestamp outside the year table
    #[error("timestamp {timestamp} outside the calendar")]
    InvalidTime {
        /// Offending timestamp
        timestamp: Timestamp,
    },
    /// The year table could not be built
    #[error("invalid calendar range {first_year}..={last_year}")]
    InvalidCalendar {
        /// First year
        first_year: i32,
        /// Last year
        last_year: i32,
    },
    /// Caller is not the required address
    #[error("{caller} is not authorized")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },
    /// No pending recovery request
    #[error("no pending recovery")]
    NoRecovery,
    /// Escrow has not elapsed
    #[error("recovery escrow ends at {ready_at}")]
    Escrow {
        /// First timestamp the request can complete
        ready_at: Timestamp,
    },
    /// Zero address supplied
    #[error("address must be non-zero")]
    InvalidAddress,
    /// Registry is paused
    #[error("name registry is paused")]
    Paused,
    /// Withdrawal above the held balance
    #[error("withdrawal of {requested} wei exceeds balance {balance}")]
    InsufficientBalance {
        /// Amount requested
        requested: Wei,
        /// Balance held
        balance: Wei,
    },
    /// Caller lacks a required role
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Refund or withdrawal send failed
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// Checked arithmetic failed
    #[error(transparent)]
    Math(#[from] LedgerError),
}

/// Name result type
pub type NameResult<T> = Result<T, NameError>;

impl From<RecoveryError> for NameError {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::Unauthorized { caller } => NameError::Unauthorized { caller },
            RecoveryError::NoRecovery => NameError::NoRecovery,
            RecoveryError::Escrow { ready_at } => NameError::Escrow { ready_at },
            RecoveryError::InvalidDestination => NameError::InvalidAddress,
        }
    }
}

impl Categorized for NameError {
    fn category(&self) -> ErrorCategory {
        match self {
            NameError::InvalidName
            | NameError::InvalidAddress
            | NameError::InvalidTime { .. }
            | NameError::InvalidCalendar { .. } => ErrorCategory::InvalidInput,
            NameError::Invitable
            | NameError::NotInvitable
            | NameError::Registrable
            | NameError::Registered
            | NameError::NotRegistrable
            | NameError::NotRenewable
            | NameError::NotBiddable
            | NameError::Expired { .. }
            | NameError::NoRecovery
            | NameError::Paused => ErrorCategory::StatePrecondition,
            NameError::CommitReplay { .. } | NameError::InvalidCommit | NameError::Escrow { .. } => {
                ErrorCategory::Timing
            }
            NameError::InsufficientFunds { .. } | NameError::InsufficientBalance { .. } => {
                ErrorCategory::Payment
            }
            NameError::Unauthorized { .. } => ErrorCategory::Authorization,
            NameError::Access(err) => err.category(),
            NameError::Transfer(err) => err.category(),
            NameError::Math(err) => err.category(),
        }
    }
}
